//! Traveling salesperson solving over small sets of geographic nodes.
//! Compares an exact brute-force search against QUBO formulations meant for
//! annealing backends, with a local simulated-annealing sampler standing in
//! for the remote service.

mod algo;
mod error;
mod evaluate;
mod graph;
mod io;
pub mod logging;
mod node;
mod qubo;
mod route;
mod sampler;
mod solver;

pub(crate) use io::options;

pub use algo::exact::{solve_exact, solve_exact_parallel};
pub use error::{Error, Result};
pub use evaluate::route_length;
pub use graph::Graph;
pub use io::input::{parse_nodes, read_nodes, read_nodes_from_reader};
pub use io::options::{LogFormat, LogLevel, QuboFormulation, SolverMode, SolverOptions};
pub use node::{EARTH_RADIUS_MILES, Node, NodeId};
pub use qubo::decoder::{decode_route, decode_slots};
pub use qubo::distribution::{DistributionEntry, SolutionDistribution};
pub use qubo::encoder::{
    EncodedQubo, FixedPenalty, default_lagrange, encode_fixed_penalty, encode_tsp, weight_factor,
};
pub use qubo::matrix::{QuboMatrix, Variable};
pub use route::Route;
pub use sampler::annealing::SimulatedAnnealingSampler;
pub use sampler::{Sample, SampleSet, Sampler, SamplerParams};
pub use solver::{Formulation, Solution, run, solve_classic, solve_hybrid, solve_quantum};
