use std::{fs::File, io, io::Write};

use env_logger::{Builder, Target};
use log::{Level, Record};

use crate::options::{LogFormat, SolverOptions};
use crate::{Error, Result};

const CRATE_TARGET_PREFIX: &str = "qtsp_core::";

/// Installs the global logger described by `options`.
/// Fails if a logger is already installed or the log file cannot be created.
pub fn init_logger(options: &SolverOptions) -> Result<()> {
    let line = LineFormat {
        format: options.log_format,
        timestamp: options.log_timestamp,
    };

    let mut builder = Builder::new();
    builder
        .filter_level(options.log_level.to_filter())
        .write_style(env_logger::WriteStyle::Never)
        .format(move |buf, record| {
            if line.timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            line.write_record(buf, record)
        });

    match options.log_output_path() {
        Some(log_path) => {
            let log_file = File::create(log_path).map_err(|e| {
                Error::other(format!(
                    "failed to create log output file {}: {e}",
                    log_path.display()
                ))
            })?;
            builder.target(Target::Pipe(Box::new(log_file)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }

    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

#[derive(Clone, Copy, Debug)]
struct LineFormat {
    format: LogFormat,
    timestamp: bool,
}

impl LineFormat {
    fn write_record(&self, out: &mut impl Write, record: &Record<'_>) -> io::Result<()> {
        let tag = level_tag(record.level());
        match self.format {
            LogFormat::Compact => writeln!(out, "{tag} {}", record.args()),
            LogFormat::Pretty => {
                writeln!(out, "{tag} [{}] {}", short_target(record.target()), record.args())
            }
        }
    }
}

fn short_target(target: &str) -> &str {
    target.strip_prefix(CRATE_TARGET_PREFIX).unwrap_or(target)
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
