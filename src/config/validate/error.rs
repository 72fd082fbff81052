//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Data path does not exist: {0}")]
    DataNotFound(String),

    #[error("Invalid test ratio: {0} (must be in [0.0, 1.0))")]
    InvalidTestRatio(f64),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid noise scale: {0} (must be >= 0.0)")]
    InvalidNoiseScale(f32),

    #[error("Invalid smoothing: {0} (must be > 0.0)")]
    InvalidSmoothing(f64),

    #[error("Column '{column}' is categorical and also listed as {other}")]
    ConflictingColumnType { column: String, other: &'static str },

    #[error("Mixed column '{0}' has a non-finite mode")]
    NonFiniteMode(String),

    #[error("Target column '{0}' must be listed as categorical for classification")]
    TargetNotCategorical(String),
}
