//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::{ProblemType, StackSpec};

/// Validate a run specification
///
/// Checks:
/// - The data path exists
/// - Numeric values are in valid ranges
/// - Column type lists do not contradict each other
pub fn validate_config(spec: &StackSpec) -> Result<(), ValidationError> {
    #[cfg(not(test))]
    if !spec.data.path.exists() {
        return Err(ValidationError::DataNotFound(spec.data.path.display().to_string()));
    }

    let ratio = spec.data.test_ratio;
    if !(0.0..1.0).contains(&ratio) {
        return Err(ValidationError::InvalidTestRatio(ratio));
    }

    let training = &spec.training;
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if training.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(training.batch_size));
    }
    if !(training.noise_scale >= 0.0 && training.noise_scale.is_finite()) {
        return Err(ValidationError::InvalidNoiseScale(training.noise_scale));
    }
    if !(training.smoothing > 0.0 && training.smoothing.is_finite()) {
        return Err(ValidationError::InvalidSmoothing(training.smoothing));
    }

    let data = &spec.data;
    for column in &data.categorical_columns {
        let other = if data.log_columns.contains(column) {
            Some("log")
        } else if data.integer_columns.contains(column) {
            Some("integer")
        } else if data.mixed_columns.contains_key(column) {
            Some("mixed")
        } else {
            None
        };
        if let Some(other) = other {
            return Err(ValidationError::ConflictingColumnType { column: column.clone(), other });
        }
    }

    for (column, modes) in &data.mixed_columns {
        if modes.iter().any(|m| !m.is_finite()) {
            return Err(ValidationError::NonFiniteMode(column.clone()));
        }
    }

    if let Some(ProblemType::Classification(target)) = &data.problem_type {
        if !data.categorical_columns.contains(target) {
            return Err(ValidationError::TargetNotCategorical(target.clone()));
        }
    }

    Ok(())
}
