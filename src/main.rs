use std::{io, time::Instant};

use log::info;

use qtsp_core::{
    Graph, Result, SimulatedAnnealingSampler, SolverOptions, logging, read_nodes,
    read_nodes_from_reader, run,
};

fn main() -> Result<()> {
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;
    info!("options: {options}");

    let nodes = match options.input_path() {
        Some(path) => read_nodes(path)?,
        None => read_nodes_from_reader(io::stdin().lock())?,
    };
    let graph = Graph::from_nodes(&nodes)?;

    let now = Instant::now();
    let solution = run(&graph, &options, &SimulatedAnnealingSampler::new())?;
    let elapsed = now.elapsed().as_secs_f64();

    println!("Route: {}", solution.route);
    println!("Length: {:.0} miles", solution.length);
    println!("Compute Time: {elapsed:.2} seconds");

    Ok(())
}
