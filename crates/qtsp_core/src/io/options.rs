use std::{env, path::Path};

use log::LevelFilter;
use qtsp_derive::{CliOptions, CliValue, KvDisplay};

use crate::{Error, FixedPenalty, Formulation, Graph, NodeId, Result, SamplerParams};

const QUANTUM_CHAIN_STRENGTH: f64 = 800.0;

/// Runtime options for a single solve.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct SolverOptions {
    /// Solver to run: `classic`, `hybrid` or `quantum`. Also accepted positionally.
    #[cli(long = "mode", parse_with = "SolverMode::parse")]
    pub mode: SolverMode,
    /// Node CSV path. `-` reads stdin.
    #[cli(long = "input")]
    pub input: String,
    /// Route start node id. Defaults to the first node of the input.
    #[cli(long = "start")]
    #[kv(fmt = "opt")]
    pub start: Option<String>,
    /// Penalty constant for the lagrange formulation. Derived from the graph when unset.
    #[cli(long = "lagrange")]
    #[kv(fmt = "opt")]
    pub lagrange: Option<f64>,
    /// QUBO formulation override. Hybrid defaults to `lagrange`, quantum to `fixed-penalty`.
    #[cli(long = "formulation", parse_with = "QuboFormulation::parse")]
    #[kv(fmt = "opt")]
    pub formulation: Option<QuboFormulation>,
    #[cli(long = "constraint-penalty")]
    pub constraint_penalty: f64,
    #[cli(long = "cost-scale")]
    pub cost_scale: f64,
    /// Samples requested from the sampler.
    #[cli(long = "num-reads")]
    pub num_reads: usize,
    /// Backend chain strength. Quantum mode falls back to 800 when unset.
    #[cli(long = "chain-strength")]
    #[kv(fmt = "opt")]
    pub chain_strength: Option<f64>,
    /// Metropolis sweeps per read.
    #[cli(long = "sweeps")]
    pub sweeps: usize,
    #[cli(long = "seed")]
    pub seed: u64,
    /// Split the exact search across threads.
    #[cli(long = "parallel", flag)]
    pub parallel: bool,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(long = "log-timestamp", flag)]
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    #[cli(long = "log-output")]
    pub log_output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "mode")]
pub enum SolverMode {
    Classic,
    Hybrid,
    Quantum,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "formulation")]
pub enum QuboFormulation {
    Lagrange,
    FixedPenalty,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for SolverOptions {
    fn default() -> Self {
        let penalty = FixedPenalty::default();
        let sampler = SamplerParams::default();
        Self {
            mode: SolverMode::Classic,
            input: String::from("data/test-data.csv"),
            start: None,
            lagrange: None,
            formulation: None,
            constraint_penalty: penalty.constraint,
            cost_scale: penalty.cost_scale,
            num_reads: sampler.num_reads,
            chain_strength: None,
            sweeps: sampler.sweeps,
            seed: sampler.seed,
            parallel: false,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: false,
            log_output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    pub fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut saw_positional_mode = false;
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                if saw_positional_mode {
                    return Err(Error::invalid_input(format!(
                        "Unexpected argument: {arg}\n\n{}",
                        Self::usage()
                    )));
                }
                options.mode = SolverMode::parse(&arg)?;
                saw_positional_mode = true;
                continue;
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        Ok(options)
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  qtsp [classic|hybrid|quantum] [options]\n\n",
            "Options:\n",
            "  --mode <classic|hybrid|quantum>\n",
            "  --input <path>\n",
            "  --start <node id>\n",
            "  --lagrange <f64>\n",
            "  --formulation <lagrange|fixed-penalty>\n",
            "  --constraint-penalty <f64>\n",
            "  --cost-scale <f64>\n",
            "  --num-reads <usize>\n",
            "  --chain-strength <f64>\n",
            "  --sweeps <usize>\n",
            "  --seed <u64>\n",
            "  --parallel[=<bool>]\n",
            "  --no-parallel\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  qtsp\n",
            "  qtsp classic --parallel --input data/test-data.csv\n",
            "  qtsp hybrid --num-reads 200 --log-level=info\n",
            "  qtsp quantum --formulation=lagrange --seed 7 < nodes.csv --input -\n",
        )
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        let log_output = self.log_output.trim();
        if log_output.is_empty() || log_output == "-" {
            None
        } else {
            Some(Path::new(log_output))
        }
    }

    pub fn input_path(&self) -> Option<&Path> {
        let input = self.input.trim();
        if input.is_empty() || input == "-" {
            None
        } else {
            Some(Path::new(input))
        }
    }

    /// The QUBO formulation for the selected mode, with overrides applied.
    pub fn formulation(&self) -> Formulation {
        let kind = self.formulation.unwrap_or(match self.mode {
            SolverMode::Quantum => QuboFormulation::FixedPenalty,
            SolverMode::Classic | SolverMode::Hybrid => QuboFormulation::Lagrange,
        });
        match kind {
            QuboFormulation::Lagrange => Formulation::Lagrange {
                lagrange: self.lagrange,
            },
            QuboFormulation::FixedPenalty => Formulation::FixedPenalty(FixedPenalty {
                constraint: self.constraint_penalty,
                cost_scale: self.cost_scale,
            }),
        }
    }

    pub fn sampler_params(&self) -> SamplerParams {
        let chain_strength = self.chain_strength.or(match self.mode {
            SolverMode::Quantum => Some(QUANTUM_CHAIN_STRENGTH),
            SolverMode::Classic | SolverMode::Hybrid => None,
        });
        SamplerParams {
            num_reads: self.num_reads,
            chain_strength,
            sweeps: self.sweeps,
            seed: self.seed,
        }
    }

    /// Resolves `--start` against the graph, falling back to its first node.
    pub fn start_node(&self, graph: &Graph) -> Result<NodeId> {
        match self.start.as_deref().map(str::trim) {
            Some(raw) => {
                let id = NodeId::new(raw);
                if !graph.contains(&id) {
                    return Err(Error::invalid_input(format!(
                        "Start node {id} is not part of the input"
                    )));
                }
                Ok(id)
            }
            None => graph
                .nodes()
                .first()
                .cloned()
                .ok_or_else(|| Error::invalid_input("No nodes provided")),
        }
    }
}
