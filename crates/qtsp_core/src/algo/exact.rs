use rayon::prelude::*;

use crate::{
    Error, Graph, NodeId, Result, Route, algo::permutations::next_permutation,
    evaluate::indexed_length,
};

/// Cheapest open path found so far, as node indices.
#[derive(Clone, Debug)]
struct Best {
    length: f64,
    order: Vec<usize>,
}

/// Brute-force search for the shortest open path that starts at `start` and
/// visits every node once.
///
/// All `(n-1)!` orders of the remaining nodes are enumerated lexicographically
/// over graph node order; only a strictly shorter path replaces the current
/// best, so ties resolve to the first order enumerated.
#[qtsp_derive::timer("solver.exact")]
pub fn solve_exact(graph: &Graph, start: &NodeId) -> Result<Route> {
    let start_idx = graph.require_index(start)?;
    let rest = others(graph, start_idx);
    log::debug!(
        "solver.exact: start={start} n={} candidates={}",
        graph.node_count(),
        factorial(rest.len())
    );

    let best = search(graph, &[start_idx], &rest)?;
    Ok(to_route(graph, best))
}

/// [`solve_exact`] with the search split by the node placed second.
///
/// Each partition keeps its own first-found minimum, and partitions are compared
/// in enumeration order, so the result is identical to the sequential search.
#[qtsp_derive::timer("solver.exact_parallel")]
pub fn solve_exact_parallel(graph: &Graph, start: &NodeId) -> Result<Route> {
    let start_idx = graph.require_index(start)?;
    let rest = others(graph, start_idx);
    if rest.len() < 2 {
        return solve_exact(graph, start);
    }
    log::debug!(
        "solver.exact_parallel: start={start} n={} partitions={}",
        graph.node_count(),
        rest.len()
    );

    let best = (0..rest.len())
        .into_par_iter()
        .map(|k| {
            let mut remaining = rest.clone();
            let second = remaining.remove(k);
            search(graph, &[start_idx, second], &remaining)
        })
        .collect::<Result<Vec<Best>>>()?
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.length < best.length {
                candidate
            } else {
                best
            }
        })
        .ok_or_else(|| Error::other("solver.exact_parallel: no partition produced a route"))?;
    Ok(to_route(graph, best))
}

fn search(graph: &Graph, prefix: &[usize], rest: &[usize]) -> Result<Best> {
    let mut positions: Vec<usize> = (0..rest.len()).collect();
    let mut order = Vec::with_capacity(prefix.len() + rest.len());
    order.extend_from_slice(prefix);
    order.extend_from_slice(rest);

    let mut best = Best {
        length: indexed_length(graph, &order)?,
        order: order.clone(),
    };

    while next_permutation(&mut positions) {
        order.truncate(prefix.len());
        order.extend(positions.iter().map(|&p| rest[p]));

        let length = indexed_length(graph, &order)?;
        if length < best.length {
            best = Best {
                length,
                order: order.clone(),
            };
        }
    }

    Ok(best)
}

fn others(graph: &Graph, start_idx: usize) -> Vec<usize> {
    (0..graph.node_count()).filter(|&i| i != start_idx).collect()
}

fn to_route(graph: &Graph, best: Best) -> Route {
    log::info!("solver.exact: best_mi={:.0}", best.length);
    best.order
        .into_iter()
        .map(|idx| graph.node(idx).clone())
        .collect::<Vec<_>>()
        .into()
}

fn factorial(k: usize) -> u128 {
    (1..=k as u128).fold(1, u128::saturating_mul)
}

#[cfg(test)]
mod tests {
    use super::{solve_exact, solve_exact_parallel};
    use crate::{EARTH_RADIUS_MILES, Error, Graph, Node, NodeId, Route, route_length};

    fn ids(raw: &[u32]) -> Route {
        raw.iter().copied().map(NodeId::from).collect::<Vec<_>>().into()
    }

    fn uniform_graph(n: u32, weight: f64) -> Graph {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..n).map(NodeId::from).collect();
        for id in &nodes {
            graph.add_node(id.clone()).expect("node");
        }
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                graph.add_edge(a, b, weight).expect("edge");
            }
        }
        graph
    }

    fn weighted_square() -> Graph {
        let mut graph = uniform_graph(4, 0.0);
        let w = [(0, 1, 1.0), (0, 2, 2.0), (0, 3, 3.0), (1, 2, 4.0), (1, 3, 5.0), (2, 3, 6.0)];
        for (a, b, weight) in w {
            graph
                .add_edge(&NodeId::from(a as u32), &NodeId::from(b as u32), weight)
                .expect("edge");
        }
        graph
    }

    #[test]
    fn equal_weights_return_first_enumerated_order() {
        let graph = uniform_graph(5, 1.0);
        let route = solve_exact(&graph, &NodeId::from(0u32)).expect("route");
        assert_eq!(route, ids(&[0, 1, 2, 3, 4]));

        let route = solve_exact(&graph, &NodeId::from(2u32)).expect("route");
        assert_eq!(route, ids(&[2, 0, 1, 3, 4]));
    }

    #[test]
    fn result_is_a_permutation_starting_at_start() {
        let graph = weighted_square();
        for start in 0u32..4 {
            let route = solve_exact(&graph, &NodeId::from(start)).expect("route");
            assert!(route.is_permutation_of(&graph));
            assert_eq!(route.first(), Some(&NodeId::from(start)));
        }
    }

    #[test]
    fn finds_shortest_open_path_on_weighted_square() {
        let graph = weighted_square();
        let route = solve_exact(&graph, &NodeId::from(0u32)).expect("route");
        // 0-1 (1) + 1-2 (4) + 2-3 (6) = 11 vs 0-2-1-3 (2+4+5) = 11, first found wins.
        assert_eq!(route, ids(&[0, 1, 2, 3]));
        assert_eq!(route_length(&graph, &route).expect("length"), 11.0);
    }

    #[test]
    fn parallel_search_matches_sequential_tie_break() {
        let uniform = uniform_graph(6, 2.0);
        let square = weighted_square();
        for graph in [&uniform, &square] {
            for start in 0u32..4 {
                let start = NodeId::from(start);
                assert_eq!(
                    solve_exact_parallel(graph, &start).expect("parallel"),
                    solve_exact(graph, &start).expect("sequential")
                );
            }
        }
    }

    #[test]
    fn single_node_graph_returns_start_only() {
        let graph = uniform_graph(1, 0.0);
        let route = solve_exact_parallel(&graph, &NodeId::from(0u32)).expect("route");
        assert_eq!(route, ids(&[0]));
    }

    #[test]
    fn unknown_start_is_rejected() {
        let graph = uniform_graph(3, 1.0);
        let err = solve_exact(&graph, &NodeId::from(42u32)).expect_err("unknown start");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn missing_edge_is_fatal() {
        let mut graph = Graph::new();
        for id in 0u32..3 {
            graph.add_node(id).expect("node");
        }
        graph
            .add_edge(&NodeId::from(0u32), &NodeId::from(1u32), 1.0)
            .expect("edge");
        let err = solve_exact(&graph, &NodeId::from(0u32)).expect_err("incomplete graph");
        assert!(matches!(err, Error::MissingEdge { .. }));
    }

    #[test]
    fn geographic_rectangle_matches_hand_computed_path() {
        // Corners of a 1x2 degree rectangle on the equator; the short sides run
        // along meridians, the far long side along the 1 degree parallel.
        let nodes = vec![
            Node::at(0u32, 0.0, 0.0),
            Node::at(1u32, 0.0, 2.0),
            Node::at(2u32, 1.0, 2.0),
            Node::at(3u32, 1.0, 0.0),
        ];
        let graph = Graph::from_nodes(&nodes).expect("graph");
        let route = solve_exact(&graph, &NodeId::from(0u32)).expect("route");
        assert_eq!(route, ids(&[0, 3, 2, 1]));

        let one_degree = 1.0_f64.to_radians();
        let meridian = EARTH_RADIUS_MILES * one_degree;
        let parallel = 2.0 * EARTH_RADIUS_MILES * (one_degree.cos() * one_degree.sin()).asin();
        let expected = meridian + parallel + meridian;
        let length = route_length(&graph, &route).expect("length");
        assert!((length - expected).abs() < 1e-6);
    }
}
