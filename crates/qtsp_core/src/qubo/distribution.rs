use std::collections::BTreeMap;

use crate::Route;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistributionEntry {
    /// Lowest energy observed for the route.
    pub energy: f64,
    pub occurrences: usize,
}

/// Decoded routes seen in a sample set, kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct SolutionDistribution {
    entries: BTreeMap<Route, DistributionEntry>,
}

impl SolutionDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, route: Route, energy: f64, occurrences: usize) {
        self.entries
            .entry(route)
            .and_modify(|entry| {
                entry.energy = entry.energy.min(energy);
                entry.occurrences += occurrences;
            })
            .or_insert(DistributionEntry {
                energy,
                occurrences,
            });
    }

    pub fn get(&self, route: &Route) -> Option<&DistributionEntry> {
        self.entries.get(route)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_occurrences(&self) -> usize {
        self.entries.values().map(|e| e.occurrences).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Route, &DistributionEntry)> {
        self.entries.iter()
    }

    /// Entries by ascending energy; equal energies keep route order.
    pub fn by_energy(&self) -> Vec<(&Route, &DistributionEntry)> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.1.energy.total_cmp(&b.1.energy));
        sorted
    }
}
