use std::collections::HashMap;

use crate::{Error, Node, NodeId, Result};

/// Undirected, edge-weighted graph over node ids.
///
/// Nodes keep their insertion order; that order defines the node index used
/// by the exact search and by QUBO variables.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    weights: Vec<Vec<Option<f64>>>,
    edge_count: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete graph with haversine weights, one edge per unordered pair.
    pub fn from_nodes(nodes: &[Node]) -> Result<Self> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node.id.clone())?;
        }

        for (i, a) in nodes.iter().enumerate() {
            for (j, b) in nodes.iter().enumerate().skip(i + 1) {
                graph.set_weight(i, j, a.distance_to(b));
            }
        }

        log::info!(
            "graph: n={} edges={} total_mi={:.0}",
            graph.node_count(),
            graph.edge_count(),
            graph.total_weight()
        );
        Ok(graph)
    }

    pub fn add_node(&mut self, id: impl Into<NodeId>) -> Result<usize> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(Error::invalid_input(format!("duplicate node id: {id}")));
        }

        let idx = self.ids.len();
        self.ids.push(id.clone());
        self.index.insert(id, idx);
        for row in &mut self.weights {
            row.push(None);
        }
        self.weights.push(vec![None; idx + 1]);
        Ok(idx)
    }

    /// Inserts or replaces the undirected edge `u - v`.
    pub fn add_edge(&mut self, u: &NodeId, v: &NodeId, weight: f64) -> Result<()> {
        let a = self.require_index(u)?;
        let b = self.require_index(v)?;
        if a == b {
            return Err(Error::invalid_input(format!("self-loop on node {u}")));
        }
        self.set_weight(a, b, weight);
        Ok(())
    }

    fn set_weight(&mut self, a: usize, b: usize, weight: f64) {
        if self.weights[a][b].is_none() {
            self.edge_count += 1;
        }
        self.weights[a][b] = Some(weight);
        self.weights[b][a] = Some(weight);
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.ids
    }

    pub(crate) fn node(&self, idx: usize) -> &NodeId {
        &self.ids[idx]
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn require_index(&self, id: &NodeId) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| Error::invalid_input(format!("unknown node id: {id}")))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn weight(&self, u: &NodeId, v: &NodeId) -> Option<f64> {
        let a = self.index_of(u)?;
        let b = self.index_of(v)?;
        self.weight_by_index(a, b)
    }

    pub fn weight_by_index(&self, a: usize, b: usize) -> Option<f64> {
        self.weights.get(a)?.get(b).copied().flatten()
    }

    /// Weight between two node indices, or `MissingEdge`.
    pub(crate) fn edge(&self, a: usize, b: usize) -> Result<f64> {
        self.weight_by_index(a, b).ok_or_else(|| Error::MissingEdge {
            from: self.ids[a].clone(),
            to: self.ids[b].clone(),
        })
    }

    /// Every edge once, as `(u, v, weight)` with `u` before `v` in node order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.ids.len()).flat_map(move |a| {
            ((a + 1)..self.ids.len())
                .filter_map(move |b| self.weights[a][b].map(|w| (a, b, w)))
        })
    }

    pub fn total_weight(&self) -> f64 {
        self.edges().map(|(_, _, w)| w).sum()
    }

    pub fn max_weight(&self) -> f64 {
        self.edges().map(|(_, _, w)| w).fold(0.0, f64::max)
    }

    /// `true` when every unordered pair has an edge.
    pub fn is_complete(&self) -> bool {
        let n = self.node_count();
        self.edge_count == n * n.saturating_sub(1) / 2
    }

    /// Dense symmetric weight matrix in node order; missing edges and the diagonal are `0`.
    pub fn distance_matrix(&self) -> Vec<Vec<f64>> {
        self.weights
            .iter()
            .map(|row| row.iter().map(|w| w.unwrap_or(0.0)).collect())
            .collect()
    }
}
