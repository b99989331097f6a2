//! Command-line interface for the Fleetroute routing core.
//!
//! Reads a JSON-encoded [`OptimizeRequest`] from a file, runs the
//! dispatcher, and writes the JSON result to stdout or a file.
#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use fleetroute_core::{OptimizeRequest, OptimizeResult, RequestValidationError};
use fleetroute_solver::Dispatcher;

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Command-line arguments could not be parsed.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// A request or output file could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The request file is not valid JSON for an `OptimizeRequest`.
    #[error("invalid request JSON: {0}")]
    RequestJson(#[source] serde_json::Error),
    /// The result could not be serialized.
    #[error("cannot serialize result: {0}")]
    ResultJson(#[source] serde_json::Error),
    /// The request failed structural validation.
    #[error(transparent)]
    InvalidRequest(#[from] RequestValidationError),
}

/// Run the Fleetroute CLI with the current process arguments.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Optimize(args) => {
            let result = run_optimize(&args)?;
            write_result(&result, &args)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fleetroute",
    about = "Heuristic fleet routing over a JSON optimisation request",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Optimise a routing request and emit the resulting plan.
    Optimize(OptimizeArgs),
}

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(
    long_about = "Read a JSON-encoded OptimizeRequest, run the dispatcher \
                  and emit the JSON OptimizeResult. Premium shipments, hub \
                  consolidation and fallbacks are selected from the request \
                  itself.",
    about = "Optimise a routing request"
)]
struct OptimizeArgs {
    /// Path to a JSON file containing an OptimizeRequest.
    #[arg(value_name = "path")]
    request_path: PathBuf,
    /// Write the result to this file instead of stdout.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
    /// Advisory solver deadline in milliseconds.
    #[arg(long, value_name = "ms")]
    deadline_ms: Option<u64>,
}

fn run_optimize(args: &OptimizeArgs) -> Result<OptimizeResult, CliError> {
    let raw = std::fs::read_to_string(&args.request_path).map_err(|source| CliError::Io {
        path: args.request_path.clone(),
        source,
    })?;
    let request: OptimizeRequest =
        serde_json::from_str(&raw).map_err(CliError::RequestJson)?;

    let mut dispatcher = Dispatcher::new();
    if let Some(ms) = args.deadline_ms {
        dispatcher = dispatcher.with_deadline(std::time::Duration::from_millis(ms));
    }
    Ok(dispatcher.optimize(&request)?)
}

fn write_result(result: &OptimizeResult, args: &OptimizeArgs) -> Result<(), CliError> {
    let rendered = if args.pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
    .map_err(CliError::ResultJson)?;

    match &args.output {
        Some(path) => std::fs::write(path, rendered).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").map_err(|source| CliError::Io {
                path: PathBuf::from("<stdout>"),
                source,
            })
        }
    }
}
