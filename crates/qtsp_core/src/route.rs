use std::{collections::HashSet, fmt};

use crate::{Error, Graph, NodeId, Result};

/// Ordered sequence of node ids. Length is not closed: the last node does not
/// connect back to the first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route {
    nodes: Vec<NodeId>,
}

impl Route {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<&NodeId> {
        self.nodes.first()
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }

    /// Cyclically rotates the route so that `start` is first, keeping relative order.
    pub fn rotate_to(&mut self, start: &NodeId) -> Result<()> {
        if self.nodes.first() == Some(start) {
            return Ok(());
        }
        let idx = self
            .nodes
            .iter()
            .position(|id| id == start)
            .ok_or_else(|| {
                Error::invalid_data(format!("start node {start} is not part of route {self}"))
            })?;
        self.nodes.rotate_left(idx);
        Ok(())
    }

    /// `true` when every node of `graph` appears exactly once.
    pub fn is_permutation_of(&self, graph: &Graph) -> bool {
        if self.nodes.len() != graph.node_count() {
            return false;
        }
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes
            .iter()
            .all(|id| graph.contains(id) && seen.insert(id))
    }
}

impl From<Vec<NodeId>> for Route {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::new(nodes)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, id) in self.nodes.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str("]")
    }
}
