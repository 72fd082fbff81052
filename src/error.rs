//! Error types for stacked synthesis
//!
//! Every variant is a local-correctness violation in a single-threaded
//! pipeline. Nothing here is retried automatically.

use std::fmt;

/// Identifies which part of the pipeline raised a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageId {
    /// Data preparation and transformer fitting
    Preparation,
    /// First-layer synthesizer
    FirstLayer,
    /// Second-layer synthesizer
    SecondLayer,
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preparation => write!(f, "data preparation"),
            Self::FirstLayer => write!(f, "first layer"),
            Self::SecondLayer => write!(f, "second layer"),
        }
    }
}

/// Library error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid column layout: {0}")]
    InvalidLayout(String),

    #[error("No categorical columns to condition on")]
    EmptySelectionSpace,

    #[error("Replay step {step} out of range ({recorded} steps recorded)")]
    StepOutOfRange { step: i64, recorded: usize },

    #[error("Row count mismatch in {stage}: expected {expected}, got {actual}")]
    RowCountMismatch {
        stage: StageId,
        expected: usize,
        actual: usize,
    },

    #[error("Recorder is frozen; draw for step {step} rejected")]
    RecorderFrozen { step: usize },

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("{stage} failed: {source}")]
    Stage {
        stage: StageId,
        #[source]
        source: Box<Error>,
    },

    #[error("Data error: {0}")]
    Data(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attribute this error to a pipeline stage
    #[must_use]
    pub fn in_stage(self, stage: StageId) -> Self {
        match self {
            already @ Self::Stage { .. } => already,
            other => Self::Stage { stage, source: Box::new(other) },
        }
    }
}

/// Result type for stacktab operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_out_of_range_display() {
        let err = Error::StepOutOfRange { step: -1, recorded: 3 };
        let msg = err.to_string();
        assert!(msg.contains("-1"));
        assert!(msg.contains("3 steps recorded"));
    }

    #[test]
    fn test_in_stage_wraps_once() {
        let err = Error::EmptySelectionSpace
            .in_stage(StageId::FirstLayer)
            .in_stage(StageId::SecondLayer);
        match err {
            Error::Stage { stage, source } => {
                assert_eq!(stage, StageId::FirstLayer);
                assert!(matches!(*source, Error::EmptySelectionSpace));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stage_display_names_stage() {
        let err = Error::StepOutOfRange { step: 7, recorded: 7 }.in_stage(StageId::SecondLayer);
        let msg = err.to_string();
        assert!(msg.starts_with("second layer failed"));
        assert!(msg.contains("step 7"));
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(err.to_string().contains("missing"));
    }
}
