//! Stacktab CLI
//!
//! # Usage
//!
//! ```bash
//! # Fit both stages and write synthetic rows
//! stacktab fit adult.yaml
//!
//! # Fit with overrides
//! stacktab fit adult.yaml --epochs 10 --seed 42 --output synthetic.csv
//!
//! # Validate config
//! stacktab validate adult.yaml
//!
//! # Show the conditioning layout
//! stacktab layout adult.yaml --format json
//! ```

use clap::Parser;
use stacktab::cli::{run_command, Cli, LogLevel};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = LogLevel::from_flags(cli.quiet, cli.verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.tracing_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
