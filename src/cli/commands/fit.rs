//! Fit command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, load_dataset, FitArgs};
use crate::pipeline::{RunReport, StackedTabGan};

fn format_report(label: &str, report: &RunReport) -> String {
    format!(
        "  {label}: {} recorded draws (generation from step {}), {} intermediate rows, {} final rows",
        report.recorded_steps, report.generation_base, report.intermediate_rows, report.final_rows
    )
}

pub fn run_fit(args: FitArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Loading config: {}", args.config.display()),
    );

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args);

    let frame = load_dataset(&spec).map_err(|e| format!("Data error: {e}"))?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Dataset: {} rows x {} columns",
            frame.n_rows(),
            frame.n_columns()
        ),
    );

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config and data are valid");
        return Ok(());
    }

    let output = spec.output.synthetic.clone();
    let mut gan = StackedTabGan::new(spec, frame);

    log(level, LogLevel::Normal, "Fitting stacked synthesizer...");
    gan.fit().map_err(|e| format!("Fit failed: {e}"))?;
    if let Some(report) = gan.last_run() {
        log(level, LogLevel::Verbose, &format_report("fit", report));
    }

    let synthetic = gan
        .generate_samples()
        .map_err(|e| format!("Generation failed: {e}"))?;
    if let Some(report) = gan.last_run() {
        log(level, LogLevel::Verbose, &format_report("generate", report));
    }

    match output {
        Some(path) => {
            synthetic
                .write_csv(&path)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            log(
                level,
                LogLevel::Normal,
                &format!("Wrote {} synthetic rows to {}", synthetic.n_rows(), path.display()),
            );
        }
        None => {
            if level != LogLevel::Quiet {
                let text = synthetic
                    .to_csv_string()
                    .map_err(|e| format!("Failed to render CSV: {e}"))?;
                print!("{text}");
            }
        }
    }

    Ok(())
}
