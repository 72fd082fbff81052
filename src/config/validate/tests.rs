//! Unit tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use crate::synth::StageConfig;
use std::path::PathBuf;

fn create_valid_spec() -> StackSpec {
    StackSpec {
        data: DataSpec {
            path: PathBuf::from("adult.csv"),
            categorical_columns: vec!["workclass".to_string(), "income".to_string()],
            log_columns: vec!["capital-gain".to_string()],
            problem_type: Some(ProblemType::Classification("income".to_string())),
            ..Default::default()
        },
        training: StageConfig::default(),
        output: OutputSpec::default(),
    }
}

#[test]
fn test_valid_config() {
    assert!(validate_config(&create_valid_spec()).is_ok());
}

#[test]
fn test_zero_test_ratio_is_valid() {
    let mut spec = create_valid_spec();
    spec.data.test_ratio = 0.0;
    assert!(validate_config(&spec).is_ok());
}

#[test]
fn test_invalid_test_ratio() {
    let mut spec = create_valid_spec();
    spec.data.test_ratio = 1.0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidTestRatio(_))));

    spec.data.test_ratio = -0.1;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidTestRatio(_))));
}

#[test]
fn test_invalid_epochs() {
    let mut spec = create_valid_spec();
    spec.training.epochs = 0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidEpochs(0))));
}

#[test]
fn test_invalid_batch_size() {
    let mut spec = create_valid_spec();
    spec.training.batch_size = 0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidBatchSize(0))));
}

#[test]
fn test_negative_noise_scale() {
    let mut spec = create_valid_spec();
    spec.training.noise_scale = -0.5;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidNoiseScale(_))));
}

#[test]
fn test_nan_noise_scale() {
    let mut spec = create_valid_spec();
    spec.training.noise_scale = f32::NAN;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidNoiseScale(_))));
}

#[test]
fn test_zero_smoothing() {
    let mut spec = create_valid_spec();
    spec.training.smoothing = 0.0;
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidSmoothing(_))));
}

#[test]
fn test_categorical_and_log_conflict() {
    let mut spec = create_valid_spec();
    spec.data.log_columns.push("workclass".to_string());
    let err = validate_config(&spec).unwrap_err();
    assert!(matches!(
        &err,
        ValidationError::ConflictingColumnType { column, other: "log" } if column == "workclass"
    ));
    assert!(err.to_string().contains("workclass"));
}

#[test]
fn test_categorical_and_integer_conflict() {
    let mut spec = create_valid_spec();
    spec.data.integer_columns.push("income".to_string());
    assert!(matches!(
        validate_config(&spec),
        Err(ValidationError::ConflictingColumnType { other: "integer", .. })
    ));
}

#[test]
fn test_non_finite_mode() {
    let mut spec = create_valid_spec();
    spec.data.mixed_columns.insert("capital-loss".to_string(), vec![0.0, f64::INFINITY]);
    assert!(matches!(validate_config(&spec), Err(ValidationError::NonFiniteMode(_))));
}

#[test]
fn test_classification_target_must_be_categorical() {
    let mut spec = create_valid_spec();
    spec.data.problem_type = Some(ProblemType::Classification("age".to_string()));
    assert!(matches!(validate_config(&spec), Err(ValidationError::TargetNotCategorical(_))));
}

#[test]
fn test_regression_target_may_be_numeric() {
    let mut spec = create_valid_spec();
    spec.data.problem_type = Some(ProblemType::Regression("age".to_string()));
    assert!(validate_config(&spec).is_ok());
}
