use crate::{Error, Graph, Result, Route};

/// Sum of edge weights between consecutive route entries (open path, no wraparound).
///
/// Fails with `MissingEdge` when two consecutive nodes are not joined by an edge,
/// which only happens on incomplete graphs or for ids outside the graph.
pub fn route_length(graph: &Graph, route: &Route) -> Result<f64> {
    route.nodes().windows(2).try_fold(0.0, |total, pair| {
        let (from, to) = (&pair[0], &pair[1]);
        graph
            .weight(from, to)
            .map(|w| total + w)
            .ok_or_else(|| Error::MissingEdge {
                from: from.clone(),
                to: to.clone(),
            })
    })
}

/// Same as [`route_length`] over node indices.
pub(crate) fn indexed_length(graph: &Graph, order: &[usize]) -> Result<f64> {
    order
        .windows(2)
        .try_fold(0.0, |total, pair| Ok(total + graph.edge(pair[0], pair[1])?))
}
