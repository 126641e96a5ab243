#![deny(missing_docs)]

//! # Clientgen CLI
//!
//! Command Line Interface for the OpenAPI client compiler.
//!
//! Supported Commands:
//! - `inspect`: Resolves a document and writes the projected client manifest.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clientgen_core::PythonProjector;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

mod error;
mod inspect;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI client compiler")]
struct Cli {
    /// Raise the default log level to debug.
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a document and write its client manifest.
    Inspect(inspect::InspectArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "clientgen=debug,clientgen_core=debug"
    } else {
        "clientgen=info,clientgen_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn report(err: &CliError) {
    eprintln!("error: {err}");
    if let Some(fragment) = err.fragment() {
        match serde_yaml::to_string(fragment) {
            Ok(text) => eprintln!("{text}"),
            Err(_) => eprintln!("{fragment}"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Inspect(args) => inspect::execute(args, &PythonProjector),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_inspect_arguments() {
        let cli = Cli::try_parse_from([
            "clientgen",
            "inspect",
            "--input",
            "openapi.yaml",
            "--format",
            "yaml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Inspect(args) = cli.command;
        assert_eq!(args.input.to_str(), Some("openapi.yaml"));
        assert_eq!(args.format, inspect::ManifestFormat::Yaml);
    }
}
