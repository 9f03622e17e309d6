use crate::{Error, Graph, QuboMatrix, Result, Variable};

const INCOMPLETE_GRAPH: &str = "graph must be a complete graph with at least 3 nodes or empty";
const EMPTY_GRAPH_LAGRANGE: f64 = 2.0;
const WEIGHT_FACTOR_DAMPING_THRESHOLD: f64 = 2.0;

/// A QUBO together with the constants it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedQubo {
    pub matrix: QuboMatrix,
    /// Number of graph nodes; the matrix has `nodes²` variables.
    pub nodes: usize,
    /// Constraint penalty applied to the one-hot terms.
    pub penalty: f64,
    /// Multiplier applied to each edge weight in the distance objective.
    pub objective_scale: f64,
}

/// Constants of the fixed-penalty formulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedPenalty {
    pub constraint: f64,
    pub cost_scale: f64,
}

impl Default for FixedPenalty {
    fn default() -> Self {
        Self {
            constraint: 400.0,
            cost_scale: 10.0,
        }
    }
}

/// Average-tour-length estimate: `total weight * n / edge count`.
/// An edgeless graph gets a fixed penalty of 2.
pub fn default_lagrange(graph: &Graph) -> f64 {
    if graph.edge_count() == 0 {
        return EMPTY_GRAPH_LAGRANGE;
    }
    graph.total_weight() * graph.node_count() as f64 / graph.edge_count() as f64
}

/// Scale of the distance objective relative to `lagrange`.
///
/// `lagrange / max_weight`, halved when that ratio exceeds 2, never below 1.
/// Graphs whose edges all weigh zero get 1.
pub fn weight_factor(lagrange: f64, max_weight: f64) -> f64 {
    if max_weight <= 0.0 || !max_weight.is_finite() {
        return 1.0;
    }
    let mut ratio = lagrange / max_weight;
    if ratio > WEIGHT_FACTOR_DAMPING_THRESHOLD {
        ratio /= 2.0;
    }
    ratio.max(1.0)
}

/// One-hot row/column constraints plus a cyclic distance objective over
/// `(node, position)` variables.
///
/// - each node takes exactly one position: `-λ` per variable, `+2λ` per pair of positions;
/// - each position holds exactly one node: `-λ` per variable, `+λ` for every ordered
///   pair of distinct nodes (so `2λ` per unordered pair);
/// - for every edge `u - v` and position `p`, `weight_factor * w(u, v)` couples
///   `(u, p)` with `(v, p+1 mod n)` and `(v, p)` with `(u, p+1 mod n)`.
///
/// `lagrange` defaults to [`default_lagrange`]. Output depends only on the graph and `λ`.
pub fn encode_tsp(graph: &Graph, lagrange: Option<f64>) -> Result<EncodedQubo> {
    ensure_encodable(graph)?;

    let n = graph.node_count();
    let lagrange = lagrange.unwrap_or_else(|| default_lagrange(graph));
    let factor = weight_factor(lagrange, graph.max_weight());
    let mut q = QuboMatrix::new(n * n);

    for node in 0..n {
        for p1 in 0..n {
            let a = Variable::new(node, p1);
            q.add_pair(a, a, n, -lagrange);
            for p2 in (p1 + 1)..n {
                q.add_pair(a, Variable::new(node, p2), n, 2.0 * lagrange);
            }
        }
    }

    for pos in 0..n {
        for n1 in 0..n {
            let a = Variable::new(n1, pos);
            q.add_pair(a, a, n, -lagrange);
            for n2 in (0..n).filter(|&n2| n2 != n1) {
                q.add_pair(a, Variable::new(n2, pos), n, lagrange);
            }
        }
    }

    for (u, v, weight) in graph.edges() {
        let cost = factor * weight;
        for pos in 0..n {
            let next = (pos + 1) % n;
            q.add_pair(Variable::new(u, pos), Variable::new(v, next), n, cost);
            q.add_pair(Variable::new(v, pos), Variable::new(u, next), n, cost);
        }
    }

    log::info!(
        "qubo.encode: formulation=lagrange n={n} variables={} terms={} lagrange={lagrange:.3} weight_factor={factor:.3}",
        q.num_variables(),
        q.len()
    );

    Ok(EncodedQubo {
        matrix: q,
        nodes: n,
        penalty: lagrange,
        objective_scale: factor,
    })
}

/// Fixed-constant formulation over distances normalised by the longest edge.
///
/// - objective: `cost_scale * w(i, j) / max_w` couples `(i, t)` with `(j, t+1 mod n)`
///   for every ordered pair `i != j`;
/// - every variable gets `-constraint` once per constraint family (two in total);
/// - `+2·constraint` is added for each ordered pair sharing a position and for
///   each ordered pair sharing a node, so an unordered pair accumulates `4·constraint`.
pub fn encode_fixed_penalty(graph: &Graph, penalty: FixedPenalty) -> Result<EncodedQubo> {
    ensure_encodable(graph)?;

    let n = graph.node_count();
    let max_weight = graph.max_weight();
    let normaliser = if max_weight > 0.0 { 1.0 / max_weight } else { 0.0 };
    let distances = graph.distance_matrix();
    let mut q = QuboMatrix::new(n * n);

    for t in 0..n {
        let next = (t + 1) % n;
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                q.add_pair(
                    Variable::new(i, t),
                    Variable::new(j, next),
                    n,
                    penalty.cost_scale * distances[i][j] * normaliser,
                );
            }
        }
    }

    for t in 0..n {
        for i in 0..n {
            let a = Variable::new(i, t);
            q.add_pair(a, a, n, -penalty.constraint);
            for j in (0..n).filter(|&j| j != i) {
                q.add_pair(a, Variable::new(j, t), n, 2.0 * penalty.constraint);
            }
        }
    }

    for i in 0..n {
        for t1 in 0..n {
            let a = Variable::new(i, t1);
            q.add_pair(a, a, n, -penalty.constraint);
            for t2 in (0..n).filter(|&t2| t2 != t1) {
                q.add_pair(a, Variable::new(i, t2), n, 2.0 * penalty.constraint);
            }
        }
    }

    log::info!(
        "qubo.encode: formulation=fixed-penalty n={n} variables={} terms={} constraint={} cost_scale={}",
        q.num_variables(),
        q.len(),
        penalty.constraint,
        penalty.cost_scale
    );

    Ok(EncodedQubo {
        matrix: q,
        nodes: n,
        penalty: penalty.constraint,
        objective_scale: penalty.cost_scale * normaliser,
    })
}

fn ensure_encodable(graph: &Graph) -> Result<()> {
    let n = graph.node_count();
    if n == 1 || n == 2 || !graph.is_complete() {
        return Err(Error::validation(format!(
            "{INCOMPLETE_GRAPH} (n={n} edges={})",
            graph.edge_count()
        )));
    }
    Ok(())
}
