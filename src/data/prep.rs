//! Pre- and post-processing of the real dataset.
//!
//! Cleans missing values, holds out a test split, log-transforms skewed
//! columns and label-encodes categorical ones. `inverse_prep` maps numeric
//! rows back into string cells.

use std::collections::BTreeMap;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::frame::TabularFrame;
use crate::config::{DataSpec, ProblemType};
use crate::{Error, Result};

/// Placeholder for missing numeric cells
pub const MISSING_SENTINEL: f64 = -9_999_999.0;

/// Category assigned to missing categorical cells
pub const MISSING_CATEGORY: &str = "empty";

/// Offset used when log-transforming non-positive columns
const LOG_EPS: f64 = 1.0;

/// Column classification after preparation, by column index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTypes {
    pub categorical: Vec<usize>,
    pub mixed: BTreeMap<usize, Vec<f64>>,
    pub integer: Vec<usize>,
    pub log: Vec<usize>,
}

impl ColumnTypes {
    #[must_use]
    pub fn is_categorical(&self, column: usize) -> bool {
        self.categorical.contains(&column)
    }
}

/// Prepared training table
#[derive(Debug, Clone)]
pub struct DataPrep {
    columns: Vec<String>,
    values: Array2<f64>,
    column_types: ColumnTypes,
    labels: BTreeMap<usize, Vec<String>>,
    log_lower: BTreeMap<usize, f64>,
}

impl DataPrep {
    /// Prepare `frame` according to `spec`; `seed` drives the split
    pub fn new(frame: &TabularFrame, spec: &DataSpec, seed: u64) -> Result<Self> {
        let resolve = |name: &str| {
            frame
                .column_index(name)
                .ok_or_else(|| Error::Data(format!("unknown column '{name}'")))
        };
        let resolve_all = |names: &[String]| names.iter().map(|n| resolve(n)).collect::<Result<Vec<_>>>();

        let mut column_types = ColumnTypes {
            categorical: resolve_all(&spec.categorical_columns)?,
            integer: resolve_all(&spec.integer_columns)?,
            log: resolve_all(&spec.log_columns)?,
            mixed: BTreeMap::new(),
        };
        for (name, modes) in &spec.mixed_columns {
            column_types.mixed.insert(resolve(name)?, modes.clone());
        }

        if frame.n_rows() == 0 {
            return Err(Error::Data("dataset has no rows".into()));
        }
        let train = split_train(frame, spec, seed)?;
        let n_rows = train.n_rows();
        let mut values = Array2::zeros((n_rows, frame.n_columns()));
        let mut labels = BTreeMap::new();

        for col in 0..frame.n_columns() {
            if column_types.is_categorical(col) {
                let cells: Vec<&str> = train
                    .column_values(col)
                    .map(|c| if c.trim().is_empty() { MISSING_CATEGORY } else { c })
                    .collect();
                let mut distinct: Vec<String> = cells.iter().map(|c| (*c).to_string()).collect();
                distinct.sort();
                distinct.dedup();
                for (row, cell) in cells.iter().enumerate() {
                    let code = distinct.iter().position(|d| d.as_str() == *cell).unwrap_or(0);
                    values[[row, col]] = code as f64;
                }
                labels.insert(col, distinct);
            } else {
                let mut has_missing = false;
                for (row, cell) in train.column_values(col).enumerate() {
                    values[[row, col]] = if cell.trim().is_empty() {
                        has_missing = true;
                        MISSING_SENTINEL
                    } else {
                        cell.trim().parse::<f64>().map_err(|_| {
                            Error::Data(format!(
                                "column '{}' row {row}: '{cell}' is not numeric",
                                frame.columns()[col]
                            ))
                        })?
                    };
                }
                if has_missing {
                    let modes = column_types.mixed.entry(col).or_default();
                    if !modes.contains(&MISSING_SENTINEL) {
                        modes.push(MISSING_SENTINEL);
                    }
                }
            }
        }

        let mut log_lower = BTreeMap::new();
        for &col in &column_types.log {
            let modes = column_types.mixed.get(&col).cloned().unwrap_or_default();
            let eligible = |v: f64| v != MISSING_SENTINEL && !modes.contains(&v);
            let lower = values
                .column(col)
                .iter()
                .copied()
                .filter(|&v| eligible(v))
                .fold(f64::INFINITY, f64::min);
            if !lower.is_finite() {
                continue;
            }
            for v in values.column_mut(col).iter_mut() {
                if eligible(*v) {
                    *v = if lower > 0.0 { v.ln() } else { (*v - lower + LOG_EPS).ln() };
                }
            }
            log_lower.insert(col, lower);
        }

        tracing::debug!(
            rows = n_rows,
            held_out = frame.n_rows() - n_rows,
            categorical = column_types.categorical.len(),
            mixed = column_types.mixed.len(),
            "data prepared"
        );

        Ok(Self {
            columns: frame.columns().to_vec(),
            values,
            column_types,
            labels,
            log_lower,
        })
    }

    /// Map prepared-space rows back to string cells
    pub fn inverse_prep(&self, values: &Array2<f64>) -> Result<TabularFrame> {
        if values.ncols() != self.columns.len() {
            return Err(Error::Data(format!(
                "expected {} columns, got {}",
                self.columns.len(),
                values.ncols()
            )));
        }

        let rows = values
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(col, &v)| self.decode_cell(col, v))
                    .collect()
            })
            .collect();

        TabularFrame::new(self.columns.clone(), rows)
    }

    fn decode_cell(&self, col: usize, value: f64) -> String {
        if let Some(labels) = self.labels.get(&col) {
            let code = value.round().clamp(0.0, (labels.len() - 1) as f64) as usize;
            return labels[code].clone();
        }
        if value == MISSING_SENTINEL {
            return String::new();
        }

        let mut v = value;
        let is_mode = self.column_types.mixed.get(&col).is_some_and(|m| m.contains(&v));
        if let (Some(&lower), false) = (self.log_lower.get(&col), is_mode) {
            v = if lower > 0.0 { v.exp() } else { v.exp() - LOG_EPS + lower };
        }
        if self.column_types.integer.contains(&col) {
            format!("{}", v.round() as i64)
        } else {
            format!("{v}")
        }
    }

    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    #[must_use]
    pub fn column_types(&self) -> &ColumnTypes {
        &self.column_types
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Category labels of a categorical column, in code order
    #[must_use]
    pub fn labels(&self, column: usize) -> Option<&[String]> {
        self.labels.get(&column).map(Vec::as_slice)
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }
}

/// Hold out `test_ratio` of the rows, stratified on a classification target
fn split_train(frame: &TabularFrame, spec: &DataSpec, seed: u64) -> Result<TabularFrame> {
    if spec.test_ratio <= 0.0 || frame.n_rows() == 0 {
        return Ok(frame.clone());
    }
    let mut rng = StdRng::seed_from_u64(seed);

    let groups: Vec<Vec<usize>> = match &spec.problem_type {
        Some(ProblemType::Classification(target)) => {
            let col = frame
                .column_index(target)
                .ok_or_else(|| Error::Data(format!("unknown target column '{target}'")))?;
            let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            for (i, v) in frame.column_values(col).enumerate() {
                by_class.entry(v).or_default().push(i);
            }
            by_class.into_values().collect()
        }
        _ => vec![(0..frame.n_rows()).collect()],
    };

    let mut keep = Vec::with_capacity(frame.n_rows());
    for mut group in groups {
        group.shuffle(&mut rng);
        let n_test = (group.len() as f64 * spec.test_ratio).round() as usize;
        keep.extend_from_slice(&group[n_test.min(group.len())..]);
    }
    keep.sort_unstable();

    if keep.is_empty() {
        return Err(Error::Data(format!(
            "test_ratio {} leaves no training rows",
            spec.test_ratio
        )));
    }
    Ok(frame.select_rows(&keep))
}
