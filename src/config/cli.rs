//! CLI types - Cli, Command and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::schema::StackSpec;

/// Stacktab: stacked conditional tabular synthesis
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "stacktab")]
#[command(version)]
#[command(about = "Two-stage conditional synthesizer for tabular data")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fit both stages and write a synthetic dataset
    Fit(FitArgs),

    /// Validate a configuration file without reading data
    Validate(ValidateArgs),

    /// Show the conditioning layout derived from the dataset
    Layout(LayoutArgs),
}

/// Arguments for the fit command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct FitArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override synthetic output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dry run (validate config and data but don't fit)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the layout command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct LayoutArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for the layout command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {s}. Valid formats: text, json")),
        }
    }
}

/// Parse CLI arguments from an iterator (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a StackSpec
pub fn apply_overrides(spec: &mut StackSpec, args: &FitArgs) {
    if let Some(epochs) = args.epochs {
        spec.training.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        spec.training.batch_size = batch_size;
    }
    if let Some(seed) = args.seed {
        spec.training.seed = Some(seed);
    }
    if let Some(output) = &args.output {
        spec.output.synthetic = Some(output.clone());
    }
}
