//! YAML schema definitions for stacked synthesis runs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::synth::StageConfig;

/// Learning task attached to the dataset, used for stratified splitting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    /// Classification on the named target column
    Classification(String),
    /// Regression on the named target column
    Regression(String),
}

impl ProblemType {
    /// Name of the target column
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Classification(c) | Self::Regression(c) => c,
        }
    }
}

/// Complete run specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackSpec {
    /// Input data and column typing
    pub data: DataSpec,

    /// Shared stage hyperparameters
    #[serde(default)]
    pub training: StageConfig,

    /// Artifact locations
    #[serde(default)]
    pub output: OutputSpec,
}

/// Input data and column typing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    /// Real dataset (CSV with header)
    #[serde(default)]
    pub path: PathBuf,

    /// Fraction of rows held out before fitting
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    /// Columns with a categorical distribution
    #[serde(default)]
    pub categorical_columns: Vec<String>,

    /// Columns with a skewed exponential distribution
    #[serde(default)]
    pub log_columns: Vec<String>,

    /// Numeric columns with categorical modes (e.g. a spike at 0.0)
    #[serde(default)]
    pub mixed_columns: BTreeMap<String, Vec<f64>>,

    /// Numeric columns without fractional values
    #[serde(default)]
    pub integer_columns: Vec<String>,

    /// Optional ML task, used to stratify the split
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<ProblemType>,
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            test_ratio: default_test_ratio(),
            categorical_columns: Vec::new(),
            log_columns: Vec::new(),
            mixed_columns: BTreeMap::new(),
            integer_columns: Vec::new(),
            problem_type: None,
        }
    }
}

fn default_test_ratio() -> f64 {
    0.2
}

/// Artifact locations; unset paths are not written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// First-layer output in transformed space
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_data: Option<PathBuf>,

    /// Recorded conditioning selections of the fit run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_conditions: Option<PathBuf>,

    /// Final synthetic dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<PathBuf>,
}
