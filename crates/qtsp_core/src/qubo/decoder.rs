use crate::{Error, Graph, NodeId, Result, Route, Variable};

/// Places `node` at `position` for every set bit of `assignment`.
///
/// No constraint checking happens here: a later bit for the same position
/// overwrites an earlier one, and positions without a set bit stay `None`.
/// `assignment` must hold `n²` bits laid out as `position * n + node`.
pub fn decode_slots(graph: &Graph, assignment: &[bool]) -> Result<Vec<Option<NodeId>>> {
    let n = graph.node_count();
    if assignment.len() != n * n {
        return Err(Error::invalid_data(format!(
            "assignment has {} bits, expected {} for n={n}",
            assignment.len(),
            n * n
        )));
    }

    let mut slots = vec![None; n];
    for (idx, _) in assignment.iter().enumerate().filter(|(_, bit)| **bit) {
        let var = Variable::from_index(idx, n);
        slots[var.position] = Some(graph.node(var.node).clone());
    }
    Ok(slots)
}

/// Decodes an assignment into a route and rotates `start` to the front.
///
/// An empty position is an error since a route cannot hold gaps. Repeated
/// nodes are passed through as decoded and only logged; nothing is repaired.
pub fn decode_route(graph: &Graph, assignment: &[bool], start: Option<&NodeId>) -> Result<Route> {
    let slots = decode_slots(graph, assignment)?;
    if let Some(position) = slots.iter().position(Option::is_none) {
        return Err(Error::invalid_data(format!(
            "position {position} has no node assigned"
        )));
    }

    let mut route = Route::new(slots.into_iter().flatten().collect());
    if !route.is_permutation_of(graph) {
        log::warn!("qubo.decode: route {route} repeats nodes; passed through unrepaired");
    }
    if let Some(start) = start {
        route.rotate_to(start)?;
    }
    Ok(route)
}
