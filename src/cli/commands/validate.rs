//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, StackSpec, ValidateArgs};

/// Format data configuration as a string
pub fn format_data_info(spec: &StackSpec) -> String {
    let data = &spec.data;
    let mut lines = vec![
        format!("  Data: {}", data.path.display()),
        format!("  Test ratio: {}", data.test_ratio),
        format!("  Categorical columns: {:?}", data.categorical_columns),
    ];
    if !data.mixed_columns.is_empty() {
        let mixed: Vec<String> =
            data.mixed_columns.iter().map(|(c, m)| format!("{c} {m:?}")).collect();
        lines.push(format!("  Mixed columns: {}", mixed.join(", ")));
    }
    if !data.log_columns.is_empty() {
        lines.push(format!("  Log columns: {:?}", data.log_columns));
    }
    if !data.integer_columns.is_empty() {
        lines.push(format!("  Integer columns: {:?}", data.integer_columns));
    }
    if let Some(problem) = &data.problem_type {
        lines.push(format!("  Stratify on: {}", problem.target()));
    }
    lines.join("\n")
}

/// Format stage hyperparameters as a string
pub fn format_training_info(spec: &StackSpec) -> String {
    let t = &spec.training;
    let mut lines = vec![
        format!("  Epochs: {}", t.epochs),
        format!("  Batch size: {}", t.batch_size),
        format!("  Noise scale: {}", t.noise_scale),
    ];
    if let Some(seed) = t.seed {
        lines.push(format!("  Seed: {seed}"));
    }
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");
    log(level, LogLevel::Verbose, &format_data_info(&spec));
    log(level, LogLevel::Verbose, &format_training_info(&spec));

    Ok(())
}
