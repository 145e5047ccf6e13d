#![deny(missing_docs)]

//! # RDL Generator CLI
//!
//! Command Line Interface for the RDL code generator's semantic layer.
//!
//! Supported Commands:
//! - `resolve`: Schema -> resolved model (JSON) for the renderer.
//! - `routes`: Schema -> route patterns only.
//! - `docs`: Schema -> Swagger 2.0 description.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::CliResult;

mod docs;
mod error;
mod loader;
mod resolve;
mod routes;

#[derive(Parser, Debug)]
#[clap(author, version, about = "RDL code generator")]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `debug`, `rdlgen_core=trace`).
    #[clap(long, global = true, default_value = "warn")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolves a schema into the renderer's model.
    Resolve(resolve::ResolveArgs),
    /// Prints the route patterns of a schema.
    Routes(routes::RoutesArgs),
    /// Writes the Swagger description of a schema.
    Docs(docs::DocsArgs),
}

/// Logs go to stderr so that stdout carries only the JSON result.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match &cli.command {
        Commands::Resolve(args) => resolve::execute(args)?,
        Commands::Routes(args) => routes::execute(args)?,
        Commands::Docs(args) => docs::execute(args)?,
    }

    Ok(())
}
