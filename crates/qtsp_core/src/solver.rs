use crate::{
    EncodedQubo, Error, FixedPenalty, Graph, NodeId, Result, Route, SampleSet, Sampler,
    SamplerParams, SolutionDistribution, SolverMode, SolverOptions, decode_route,
    encode_fixed_penalty, encode_tsp, route_length, solve_exact, solve_exact_parallel,
};

const DISTRIBUTION_LOG_LIMIT: usize = 5;

/// A solved route with its open-path length in miles.
#[derive(Clone, Debug)]
pub struct Solution {
    pub route: Route,
    pub length: f64,
    /// Every decodable sample, kept by the quantum pipeline only.
    pub distribution: Option<SolutionDistribution>,
}

/// How a graph is turned into a QUBO before sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Formulation {
    /// Penalty λ with a weight-scaled distance term; λ is derived when `None`.
    Lagrange { lagrange: Option<f64> },
    /// Fixed constraint constant over max-normalised distances.
    FixedPenalty(FixedPenalty),
}

impl Formulation {
    pub fn encode(&self, graph: &Graph) -> Result<EncodedQubo> {
        match *self {
            Self::Lagrange { lagrange } => encode_tsp(graph, lagrange),
            Self::FixedPenalty(penalty) => encode_fixed_penalty(graph, penalty),
        }
    }
}

#[qtsp_derive::timer("solver.classic")]
pub fn solve_classic(graph: &Graph, start: &NodeId, parallel: bool) -> Result<Solution> {
    let route = if parallel {
        solve_exact_parallel(graph, start)?
    } else {
        solve_exact(graph, start)?
    };
    let length = route_length(graph, &route)?;
    Ok(Solution {
        route,
        length,
        distribution: None,
    })
}

/// Encodes, samples and keeps the lowest-energy sample that decodes into a
/// measurable route.
#[qtsp_derive::timer("solver.hybrid")]
pub fn solve_hybrid(
    graph: &Graph,
    start: Option<&NodeId>,
    formulation: &Formulation,
    sampler: &dyn Sampler,
    params: &SamplerParams,
) -> Result<Solution> {
    let samples = encode_and_sample(graph, formulation, sampler, params)?;

    let mut rejected = 0usize;
    for sample in &samples {
        match evaluate_sample(graph, &sample.assignment, start) {
            Ok((route, length)) => {
                log::debug!(
                    "solver.hybrid: picked energy={:.4} after {rejected} rejected samples",
                    sample.energy
                );
                return Ok(Solution {
                    route,
                    length,
                    distribution: None,
                });
            }
            Err(err) => {
                rejected += 1;
                log::trace!("solver.hybrid: skipped sample: {err}");
            }
        }
    }
    Err(no_decodable_sample(sampler, rejected))
}

/// Like [`solve_hybrid`], but decodes every sample into a route distribution.
#[qtsp_derive::timer("solver.quantum")]
pub fn solve_quantum(
    graph: &Graph,
    start: Option<&NodeId>,
    formulation: &Formulation,
    sampler: &dyn Sampler,
    params: &SamplerParams,
) -> Result<Solution> {
    let samples = encode_and_sample(graph, formulation, sampler, params)?;

    let mut distribution = SolutionDistribution::new();
    let mut best: Option<(Route, f64)> = None;
    let mut rejected = 0usize;
    for sample in &samples {
        let (route, length) = match evaluate_sample(graph, &sample.assignment, start) {
            Ok(evaluated) => evaluated,
            Err(err) => {
                rejected += 1;
                log::trace!("solver.quantum: skipped sample: {err}");
                continue;
            }
        };
        if best.is_none() {
            best = Some((route.clone(), length));
        }
        distribution.record(route, sample.energy, sample.num_occurrences);
    }

    let Some((route, length)) = best else {
        return Err(no_decodable_sample(sampler, rejected));
    };

    log::debug!(
        "solver.quantum: distinct_routes={} decoded={} rejected={rejected}",
        distribution.len(),
        distribution.total_occurrences()
    );
    for (candidate, entry) in distribution.by_energy().into_iter().take(DISTRIBUTION_LOG_LIMIT) {
        log::debug!(
            "solver.quantum: route={candidate} energy={:.4} occurrences={}",
            entry.energy,
            entry.occurrences
        );
    }

    Ok(Solution {
        route,
        length,
        distribution: Some(distribution),
    })
}

/// Runs the solver selected by `options.mode`.
pub fn run(graph: &Graph, options: &SolverOptions, sampler: &dyn Sampler) -> Result<Solution> {
    let start = options.start_node(graph)?;
    log::info!(
        "solver: mode={} nodes={} start={start}",
        options.mode,
        graph.node_count()
    );
    match options.mode {
        SolverMode::Classic => solve_classic(graph, &start, options.parallel),
        SolverMode::Hybrid => solve_hybrid(
            graph,
            Some(&start),
            &options.formulation(),
            sampler,
            &options.sampler_params(),
        ),
        SolverMode::Quantum => solve_quantum(
            graph,
            Some(&start),
            &options.formulation(),
            sampler,
            &options.sampler_params(),
        ),
    }
}

fn encode_and_sample(
    graph: &Graph,
    formulation: &Formulation,
    sampler: &dyn Sampler,
    params: &SamplerParams,
) -> Result<SampleSet> {
    let encoded = formulation.encode(graph)?;
    let samples = sampler.sample_qubo(&encoded.matrix, params)?;
    log::info!(
        "sampler: name={} distinct={} reads={}",
        sampler.name(),
        samples.len(),
        samples.total_occurrences()
    );
    Ok(samples)
}

/// Decodes a sample and measures it. Routes that repeat a node next to
/// itself have no edge to measure and fail here like gaps do.
fn evaluate_sample(
    graph: &Graph,
    assignment: &[bool],
    start: Option<&NodeId>,
) -> Result<(Route, f64)> {
    let route = decode_route(graph, assignment, start)?;
    let length = route_length(graph, &route)?;
    Ok((route, length))
}

fn no_decodable_sample(sampler: &dyn Sampler, rejected: usize) -> Error {
    Error::sampler(format!(
        "{} returned no sample that decodes to a complete route ({rejected} rejected)",
        sampler.name()
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{Formulation, run, solve_classic, solve_hybrid, solve_quantum};
    use crate::{
        Error, FixedPenalty, Graph, Node, NodeId, QuboMatrix, Result, Route, Sample, SampleSet,
        Sampler, SamplerParams, SimulatedAnnealingSampler, SolverOptions, Variable,
    };

    /// Replays fixed assignments and records the params it was called with.
    struct ScriptedSampler {
        samples: Vec<(Vec<bool>, f64, usize)>,
        seen: Mutex<Vec<SamplerParams>>,
    }

    impl ScriptedSampler {
        fn new(samples: Vec<(Vec<bool>, f64, usize)>) -> Self {
            Self {
                samples,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Sampler for ScriptedSampler {
        fn name(&self) -> &str {
            "scripted"
        }

        fn sample_qubo(&self, _qubo: &QuboMatrix, params: &SamplerParams) -> Result<SampleSet> {
            self.seen.lock().expect("lock").push(params.clone());
            Ok(SampleSet::new(
                self.samples
                    .iter()
                    .map(|(assignment, energy, count)| Sample {
                        assignment: assignment.clone(),
                        energy: *energy,
                        num_occurrences: *count,
                    })
                    .collect(),
            ))
        }
    }

    struct FailingSampler;

    impl Sampler for FailingSampler {
        fn name(&self) -> &str {
            "failing"
        }

        fn sample_qubo(&self, _qubo: &QuboMatrix, _params: &SamplerParams) -> Result<SampleSet> {
            Err(Error::sampler("backend unreachable"))
        }
    }

    fn square() -> Graph {
        let mut graph = Graph::new();
        for id in 0..4u32 {
            graph.add_node(id).expect("node");
        }
        let weights = [
            (0u32, 1u32, 1.0),
            (0, 2, 2.0),
            (0, 3, 3.0),
            (1, 2, 4.0),
            (1, 3, 5.0),
            (2, 3, 6.0),
        ];
        for (u, v, w) in weights {
            graph.add_edge(&u.into(), &v.into(), w).expect("edge");
        }
        graph
    }

    fn one_hot(order: &[usize]) -> Vec<bool> {
        let n = order.len();
        let mut bits = vec![false; n * n];
        for (pos, &node) in order.iter().enumerate() {
            bits[Variable::new(node, pos).index(n)] = true;
        }
        bits
    }

    fn route(ids: &[u32]) -> Route {
        ids.iter().copied().map(NodeId::from).collect::<Vec<_>>().into()
    }

    fn lagrange() -> Formulation {
        Formulation::Lagrange { lagrange: None }
    }

    #[test]
    fn classic_returns_open_path_optimum() {
        let graph = square();
        let start = NodeId::from(0u32);
        for parallel in [false, true] {
            let solution = solve_classic(&graph, &start, parallel).expect("solve");
            assert_eq!(solution.route, route(&[0, 1, 2, 3]));
            assert_eq!(solution.length, 11.0);
            assert!(solution.distribution.is_none());
        }
    }

    #[test]
    fn hybrid_skips_undecodable_samples_and_rotates_to_start() {
        let graph = square();
        let gap = vec![false; 16];
        let sampler = ScriptedSampler::new(vec![
            (gap, -100.0, 4),
            (one_hot(&[2, 3, 0, 1]), -50.0, 1),
            (one_hot(&[0, 2, 1, 3]), -10.0, 1),
        ]);
        let start = NodeId::from(0u32);

        let solution = solve_hybrid(
            &graph,
            Some(&start),
            &lagrange(),
            &sampler,
            &SamplerParams::default(),
        )
        .expect("solve");
        assert_eq!(solution.route, route(&[0, 1, 2, 3]));
        assert_eq!(solution.length, 11.0);
        assert!(solution.distribution.is_none());
    }

    #[test]
    fn quantum_keeps_the_decoded_distribution() {
        let graph = square();
        let sampler = ScriptedSampler::new(vec![
            (one_hot(&[1, 0, 3, 2]), -30.0, 2),
            (one_hot(&[0, 1, 3, 2]), -20.0, 5),
            (vec![false; 16], -90.0, 3),
            (one_hot(&[3, 2, 0, 1]), -25.0, 1),
        ]);
        let start = NodeId::from(0u32);
        let formulation = Formulation::FixedPenalty(FixedPenalty::default());

        let solution = solve_quantum(
            &graph,
            Some(&start),
            &formulation,
            &sampler,
            &SamplerParams::default(),
        )
        .expect("solve");

        assert_eq!(solution.route, route(&[0, 3, 2, 1]));
        assert_eq!(solution.length, 3.0 + 6.0 + 4.0);

        let distribution = solution.distribution.expect("distribution");
        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution.total_occurrences(), 8);
        let best = distribution.get(&route(&[0, 3, 2, 1])).expect("best");
        assert_eq!(best.energy, -30.0);
        assert_eq!(best.occurrences, 2);
        let merged = distribution.get(&route(&[0, 1, 3, 2])).expect("merged");
        assert_eq!(merged.energy, -25.0);
        assert_eq!(merged.occurrences, 6);
    }

    fn repeated_adjacent_node() -> Vec<bool> {
        let n = 4;
        let mut bits = vec![false; n * n];
        for (node, pos) in [(0, 0), (1, 1), (1, 2), (2, 3)] {
            bits[Variable::new(node, pos).index(n)] = true;
        }
        bits
    }

    #[test]
    fn samples_without_a_measurable_route_are_skipped() {
        let graph = square();
        let start = NodeId::from(0u32);
        let sampler = ScriptedSampler::new(vec![
            (repeated_adjacent_node(), -100.0, 3),
            (one_hot(&[0, 1, 2, 3]), -50.0, 1),
        ]);

        let hybrid = solve_hybrid(
            &graph,
            Some(&start),
            &lagrange(),
            &sampler,
            &SamplerParams::default(),
        )
        .expect("hybrid");
        assert_eq!(hybrid.route, route(&[0, 1, 2, 3]));
        assert_eq!(hybrid.length, 11.0);

        let quantum = solve_quantum(
            &graph,
            Some(&start),
            &lagrange(),
            &sampler,
            &SamplerParams::default(),
        )
        .expect("quantum");
        assert_eq!(quantum.route, route(&[0, 1, 2, 3]));
        assert_eq!(quantum.length, 11.0);
        let distribution = quantum.distribution.expect("distribution");
        assert_eq!(distribution.len(), 1);
        assert_eq!(distribution.total_occurrences(), 1);
    }

    #[test]
    fn no_decodable_sample_is_a_sampler_error() {
        let graph = square();
        let sampler = ScriptedSampler::new(vec![(vec![false; 16], 0.0, 1)]);
        let err = solve_hybrid(&graph, None, &lagrange(), &sampler, &SamplerParams::default())
            .expect_err("nothing decodes");
        assert!(matches!(err, Error::Sampler(_)));
        assert!(err.to_string().contains("scripted returned no sample"));
    }

    #[test]
    fn sampler_failures_surface_unchanged() {
        let err = solve_quantum(
            &square(),
            None,
            &lagrange(),
            &FailingSampler,
            &SamplerParams::default(),
        )
        .expect_err("backend failure");
        assert!(err.to_string().contains("backend unreachable"));
    }

    #[test]
    fn incomplete_graph_fails_before_sampling() {
        let mut graph = Graph::new();
        for id in 0..3u32 {
            graph.add_node(id).expect("node");
        }
        let sampler = ScriptedSampler::new(Vec::new());
        let err = solve_hybrid(&graph, None, &lagrange(), &sampler, &SamplerParams::default())
            .expect_err("incomplete");
        assert!(matches!(err, Error::Validation(_)));
        assert!(sampler.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn run_dispatches_on_mode_and_forwards_sampler_params() {
        let graph = square();
        let sampler = ScriptedSampler::new(vec![(one_hot(&[0, 1, 2, 3]), -1.0, 1)]);

        let options =
            SolverOptions::parse_from_iter(["quantum", "--num-reads=7"]).expect("options");
        let solution = run(&graph, &options, &sampler).expect("run");
        assert!(solution.distribution.is_some());

        let options = SolverOptions::parse_from_iter(["hybrid", "--seed=3"]).expect("options");
        let solution = run(&graph, &options, &sampler).expect("run");
        assert!(solution.distribution.is_none());

        let seen = sampler.seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].num_reads, 7);
        assert_eq!(seen[0].chain_strength, Some(800.0));
        assert_eq!(seen[1].seed, 3);
        assert_eq!(seen[1].chain_strength, None);
    }

    #[test]
    fn run_classic_never_calls_the_sampler() {
        let graph = square();
        let sampler = ScriptedSampler::new(Vec::new());
        let options = SolverOptions::parse_from_iter(["--start=2"]).expect("options");
        let solution = run(&graph, &options, &sampler).expect("run");
        assert_eq!(solution.route.first(), Some(&NodeId::from(2u32)));
        assert!(sampler.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn annealed_hybrid_run_finds_a_valid_route() {
        let nodes = [
            Node::at(0u32, 0.0, 0.0),
            Node::at(1u32, 0.0, 2.0),
            Node::at(2u32, 1.0, 2.0),
            Node::at(3u32, 1.0, 0.0),
        ];
        let graph = Graph::from_nodes(&nodes).expect("graph");
        let options = SolverOptions::parse_from_iter(["hybrid", "--num-reads=64", "--sweeps=500"])
            .expect("options");

        let solution = run(&graph, &options, &SimulatedAnnealingSampler).expect("run");
        assert!(solution.route.is_permutation_of(&graph));
        assert_eq!(solution.route.first(), Some(&NodeId::from(0u32)));
        assert!(solution.length > 0.0);
    }
}
