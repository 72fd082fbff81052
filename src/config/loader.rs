//! YAML loading entry points

use std::fs;
use std::path::Path;

use super::schema::StackSpec;
use super::validate::validate_config;
use crate::data::TabularFrame;
use crate::{Error, Result};

/// Load and validate a run specification
///
/// # Example
///
/// ```no_run
/// use stacktab::config::load_config;
///
/// let spec = load_config("adult.yaml")?;
/// println!("{} categorical columns", spec.data.categorical_columns.len());
/// # Ok::<(), stacktab::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<StackSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    let mut spec: StackSpec = serde_yaml::from_str(&yaml_content)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;

    // Relative data paths are resolved against the config file
    if spec.data.path.is_relative() {
        if let Some(dir) = config_path.as_ref().parent() {
            spec.data.path = dir.join(&spec.data.path);
        }
    }

    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;

    Ok(spec)
}

/// Read the real dataset named by `spec`
pub fn load_dataset(spec: &StackSpec) -> Result<TabularFrame> {
    TabularFrame::read_csv(&spec.data.path).map_err(|e| match e {
        Error::Io(io) => Error::Data(format!(
            "Failed to read dataset {}: {io}",
            spec.data.path.display()
        )),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data:\n  path: data.csv\n  categorical_columns: [color]\ntraining:\n  epochs: 2"
        )
        .unwrap();

        let spec = load_config(file.path()).unwrap();
        assert_eq!(spec.training.epochs, 2);
        assert_eq!(spec.data.path, file.path().parent().unwrap().join("data.csv"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/stack.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigError(msg) if msg.contains("Failed to read")));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "data: [unclosed").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(msg) if msg.contains("parse")));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "data:\n  path: data.csv\ntraining:\n  batch_size: 0").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(msg) if msg.contains("batch size")));
    }

    #[test]
    fn test_load_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "color,price\nred,1\nblue,2\n").unwrap();

        let spec = StackSpec {
            data: crate::config::DataSpec { path, ..Default::default() },
            training: Default::default(),
            output: Default::default(),
        };
        assert_eq!(load_dataset(&spec).unwrap().n_rows(), 2);
    }

    #[test]
    fn test_load_dataset_missing() {
        let spec = StackSpec {
            data: crate::config::DataSpec {
                path: "/nonexistent/data.csv".into(),
                ..Default::default()
            },
            training: Default::default(),
            output: Default::default(),
        };
        assert!(matches!(load_dataset(&spec), Err(Error::Data(_))));
    }
}
