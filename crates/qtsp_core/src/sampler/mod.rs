pub(crate) mod annealing;

use std::collections::HashMap;

use crate::{QuboMatrix, Result};

/// Knobs forwarded to a sampler for one submission.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerParams {
    pub num_reads: usize,
    /// Only meaningful for backends that embed logical variables into chains.
    pub chain_strength: Option<f64>,
    pub sweeps: usize,
    pub seed: u64,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            num_reads: 1000,
            chain_strength: None,
            sweeps: 1000,
            seed: 12345,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub assignment: Vec<bool>,
    pub energy: f64,
    pub num_occurrences: usize,
}

/// Samples ordered by ascending energy.
#[derive(Clone, Debug, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Sorts `samples` by energy. Equal energies keep their given order.
    pub fn new(mut samples: Vec<Sample>) -> Self {
        samples.sort_by(|a, b| a.energy.total_cmp(&b.energy));
        Self { samples }
    }

    /// Builds a set from raw reads, merging identical assignments.
    pub fn from_reads(qubo: &QuboMatrix, reads: Vec<Vec<bool>>) -> Self {
        let mut seen: HashMap<Vec<bool>, usize> = HashMap::with_capacity(reads.len());
        let mut samples: Vec<Sample> = Vec::new();
        for assignment in reads {
            if let Some(&idx) = seen.get(&assignment) {
                samples[idx].num_occurrences += 1;
                continue;
            }
            seen.insert(assignment.clone(), samples.len());
            let energy = qubo.energy(&assignment);
            samples.push(Sample {
                assignment,
                energy,
                num_occurrences: 1,
            });
        }
        Self::new(samples)
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn total_occurrences(&self) -> usize {
        self.samples.iter().map(|s| s.num_occurrences).sum()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Anything that turns a QUBO into ranked candidate assignments.
pub trait Sampler: Sync {
    fn name(&self) -> &str;

    fn sample_qubo(&self, qubo: &QuboMatrix, params: &SamplerParams) -> Result<SampleSet>;
}

#[cfg(test)]
mod tests {
    use super::{Sample, SampleSet, SamplerParams};
    use crate::QuboMatrix;

    fn sample(bits: &[bool], energy: f64) -> Sample {
        Sample {
            assignment: bits.to_vec(),
            energy,
            num_occurrences: 1,
        }
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let params = SamplerParams::default();
        assert_eq!(params.num_reads, 1000);
        assert_eq!(params.sweeps, 1000);
        assert_eq!(params.seed, 12345);
        assert!(params.chain_strength.is_none());
    }

    #[test]
    fn new_sorts_stably_by_energy() {
        let set = SampleSet::new(vec![
            sample(&[true, false], 1.0),
            sample(&[false, true], -1.0),
            sample(&[true, true], -1.0),
        ]);
        let order: Vec<Vec<bool>> = set.iter().map(|s| s.assignment.clone()).collect();
        assert_eq!(
            order,
            vec![vec![false, true], vec![true, true], vec![true, false]]
        );
    }

    #[test]
    fn from_reads_merges_identical_assignments() {
        let mut qubo = QuboMatrix::new(2);
        qubo.add(0, 0, -1.0);
        qubo.add(1, 1, -2.0);

        let set = SampleSet::from_reads(
            &qubo,
            vec![
                vec![true, false],
                vec![false, true],
                vec![true, false],
                vec![false, false],
            ],
        );
        assert_eq!(set.len(), 3);
        assert_eq!(set.total_occurrences(), 4);

        let best = set.first().expect("best");
        assert_eq!(best.assignment, vec![false, true]);
        assert_eq!(best.energy, -2.0);

        let merged = set
            .iter()
            .find(|s| s.assignment == vec![true, false])
            .expect("merged");
        assert_eq!(merged.num_occurrences, 2);
        assert_eq!(merged.energy, -1.0);
    }
}
