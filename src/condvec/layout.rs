//! Column layout of the transformed data space.
//!
//! The layout is an immutable snapshot of where each categorical one-hot
//! block lives, both inside a transformed row and inside the concatenated
//! conditioning space, together with the two category distributions the
//! sampler draws from.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Relative tolerance used when checking that a mass vector sums to 1
const MASS_TOLERANCE: f64 = 1e-6;

/// Activation applied to a span of the transformed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanActivation {
    /// Continuous value scaled to [-1, 1]
    Tanh,
    /// One-hot categorical block
    Softmax,
}

/// One contiguous span of the transformed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpan {
    /// Number of columns covered by the span
    pub width: usize,
    /// Activation of the span
    pub activation: SpanActivation,
}

impl OutputSpan {
    #[must_use]
    pub fn tanh(width: usize) -> Self {
        Self { width, activation: SpanActivation::Tanh }
    }

    #[must_use]
    pub fn softmax(width: usize) -> Self {
        Self { width, activation: SpanActivation::Softmax }
    }
}

/// Descriptor of one categorical one-hot block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    /// Offset of the block in the conditioning space
    pub start_offset: usize,
    /// Offset of the block in a transformed row
    pub data_offset: usize,
    /// Width of the block
    pub width: usize,
    /// Number of categories
    pub category_count: usize,
    /// Raw category frequencies, normalised
    pub probability_mass: Vec<f64>,
    /// `ln(freq + 1)`, normalised
    pub log_probability_mass: Vec<f64>,
}

impl CategoricalColumn {
    /// Build a descriptor from raw category frequencies
    ///
    /// All-zero frequencies produce a uniform distribution.
    #[must_use]
    pub fn from_frequencies(start_offset: usize, data_offset: usize, freq: &[f64]) -> Self {
        let width = freq.len();
        let total: f64 = freq.iter().sum();
        let probability_mass = if total > 0.0 {
            freq.iter().map(|f| f / total).collect()
        } else {
            vec![1.0 / width.max(1) as f64; width]
        };

        let log_freq: Vec<f64> = freq.iter().map(|f| (f + 1.0).ln()).collect();
        let log_total: f64 = log_freq.iter().sum();
        let log_probability_mass = if log_total > 0.0 {
            log_freq.iter().map(|f| f / log_total).collect()
        } else {
            vec![1.0 / width.max(1) as f64; width]
        };

        Self {
            start_offset,
            data_offset,
            width,
            category_count: width,
            probability_mass,
            log_probability_mass,
        }
    }

    /// End of the block in the conditioning space (exclusive)
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.width
    }

    fn validate(&self, index: usize, data_width: usize) -> Result<()> {
        if self.width == 0 {
            return Err(Error::InvalidLayout(format!("column {index} has zero width")));
        }
        if self.category_count != self.width {
            return Err(Error::InvalidLayout(format!(
                "column {index}: category count {} does not match width {}",
                self.category_count, self.width
            )));
        }
        if self.data_offset + self.width > data_width {
            return Err(Error::InvalidLayout(format!(
                "column {index}: data span {}..{} exceeds row width {data_width}",
                self.data_offset,
                self.data_offset + self.width
            )));
        }
        check_mass(index, "probability_mass", &self.probability_mass, self.width)?;
        check_mass(index, "log_probability_mass", &self.log_probability_mass, self.width)
    }
}

fn check_mass(index: usize, name: &str, mass: &[f64], width: usize) -> Result<()> {
    if mass.len() != width {
        return Err(Error::InvalidLayout(format!(
            "column {index}: {name} has {} entries, expected {width}",
            mass.len()
        )));
    }
    if mass.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(Error::InvalidLayout(format!(
            "column {index}: {name} contains a negative or non-finite entry"
        )));
    }
    let sum: f64 = mass.iter().sum();
    if (sum - 1.0).abs() > MASS_TOLERANCE * width as f64 {
        return Err(Error::InvalidLayout(format!(
            "column {index}: {name} sums to {sum}, expected 1"
        )));
    }
    Ok(())
}

/// Ordered categorical blocks of the transformed space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    columns: Vec<CategoricalColumn>,
    data_width: usize,
}

impl ColumnLayout {
    /// Create a layout from explicit descriptors, validating it
    pub fn new(columns: Vec<CategoricalColumn>, data_width: usize) -> Result<Self> {
        let layout = Self { columns, data_width };
        layout.validate()?;
        Ok(layout)
    }

    /// Derive the layout from transformed data and its span description
    pub fn from_transformed(data: &Array2<f32>, output_info: &[OutputSpan]) -> Result<Self> {
        let data_width: usize = output_info.iter().map(|s| s.width).sum();
        if data.ncols() != data_width {
            return Err(Error::InvalidLayout(format!(
                "transformed data has {} columns but spans cover {data_width}",
                data.ncols()
            )));
        }

        let mut columns = Vec::new();
        let mut data_offset = 0;
        let mut cond_offset = 0;

        for span in output_info {
            if span.activation == SpanActivation::Softmax {
                let freq: Vec<f64> = (data_offset..data_offset + span.width)
                    .map(|c| data.column(c).iter().map(|&v| f64::from(v)).sum::<f64>())
                    .collect();
                columns.push(CategoricalColumn::from_frequencies(cond_offset, data_offset, &freq));
                cond_offset += span.width;
            }
            data_offset += span.width;
        }

        Self::new(columns, data_width)
    }

    /// Check structural and distributional invariants
    pub fn validate(&self) -> Result<()> {
        if self.data_width == 0 && self.columns.is_empty() {
            return Err(Error::InvalidLayout("layout is empty".into()));
        }

        let mut expected_start = 0;
        let mut prev_data_end = 0;
        for (i, col) in self.columns.iter().enumerate() {
            if col.start_offset != expected_start {
                return Err(Error::InvalidLayout(format!(
                    "column {i} starts at {} in conditioning space, expected {expected_start}",
                    col.start_offset
                )));
            }
            if col.data_offset < prev_data_end {
                return Err(Error::InvalidLayout(format!(
                    "column {i} overlaps the previous column in the data row"
                )));
            }
            col.validate(i, self.data_width)?;
            expected_start = col.end_offset();
            prev_data_end = col.data_offset + col.width;
        }

        if self.columns.is_empty() {
            return Err(Error::EmptySelectionSpace);
        }
        Ok(())
    }

    /// Categorical column descriptors in order
    #[must_use]
    pub fn columns(&self) -> &[CategoricalColumn] {
        &self.columns
    }

    /// Number of categorical columns (mask width)
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Total number of categories (conditioning vector width)
    #[must_use]
    pub fn n_options(&self) -> usize {
        self.columns.last().map_or(0, CategoricalColumn::end_offset)
    }

    /// Width of a transformed row
    #[must_use]
    pub fn data_width(&self) -> usize {
        self.data_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_from_frequencies_masses() {
        let col = CategoricalColumn::from_frequencies(0, 0, &[3.0, 1.0]);
        assert_abs_diff_eq!(col.probability_mass[0], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(col.probability_mass[1], 0.25, epsilon = 1e-12);

        let l3 = 4.0_f64.ln();
        let l1 = 2.0_f64.ln();
        assert_abs_diff_eq!(col.log_probability_mass[0], l3 / (l3 + l1), epsilon = 1e-12);
    }

    #[test]
    fn test_log_mass_flatter_than_raw() {
        let col = CategoricalColumn::from_frequencies(0, 0, &[950.0, 50.0]);
        assert!(col.log_probability_mass[1] > col.probability_mass[1]);
    }

    #[test]
    fn test_from_transformed_skips_tanh_spans() {
        // tanh | softmax(2) | tanh | softmax(3)
        let data = array![
            [0.1, 1.0, 0.0, -0.5, 0.0, 0.0, 1.0],
            [0.3, 0.0, 1.0, 0.2, 1.0, 0.0, 0.0],
            [-0.2, 1.0, 0.0, 0.9, 0.0, 0.0, 1.0],
        ];
        let info = [
            OutputSpan::tanh(1),
            OutputSpan::softmax(2),
            OutputSpan::tanh(1),
            OutputSpan::softmax(3),
        ];
        let layout = ColumnLayout::from_transformed(&data, &info).unwrap();

        assert_eq!(layout.n_columns(), 2);
        assert_eq!(layout.n_options(), 5);
        assert_eq!(layout.data_width(), 7);

        let cols = layout.columns();
        assert_eq!((cols[0].start_offset, cols[0].data_offset), (0, 1));
        assert_eq!((cols[1].start_offset, cols[1].data_offset), (2, 4));
        assert_abs_diff_eq!(cols[1].probability_mass[2], 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cols[1].probability_mass[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_transformed_width_mismatch() {
        let data = array![[1.0, 0.0]];
        let result = ColumnLayout::from_transformed(&data, &[OutputSpan::softmax(3)]);
        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_empty_layout_is_invalid() {
        let result = ColumnLayout::new(vec![], 0);
        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_continuous_only_layout_is_empty_selection_space() {
        let data = array![[0.1, 0.2], [0.3, -0.4]];
        let result = ColumnLayout::from_transformed(&data, &[OutputSpan::tanh(1), OutputSpan::tanh(1)]);
        assert!(matches!(result, Err(Error::EmptySelectionSpace)));
    }

    #[test]
    fn test_mass_not_summing_to_one() {
        let mut col = CategoricalColumn::from_frequencies(0, 0, &[1.0, 1.0]);
        col.probability_mass = vec![0.5, 0.6];
        let result = ColumnLayout::new(vec![col], 2);
        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_overlapping_columns_rejected() {
        let a = CategoricalColumn::from_frequencies(0, 0, &[1.0, 1.0]);
        let b = CategoricalColumn::from_frequencies(2, 1, &[1.0, 1.0]);
        let result = ColumnLayout::new(vec![a, b], 4);
        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_gap_in_conditioning_space_rejected() {
        let a = CategoricalColumn::from_frequencies(0, 0, &[1.0, 1.0]);
        let b = CategoricalColumn::from_frequencies(3, 2, &[1.0, 1.0]);
        let result = ColumnLayout::new(vec![a, b], 4);
        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_span_overrunning_row_rejected() {
        let a = CategoricalColumn::from_frequencies(0, 1, &[1.0, 1.0]);
        let result = ColumnLayout::new(vec![a], 2);
        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }

    proptest! {
        #[test]
        fn test_masses_always_normalised(freq in prop::collection::vec(0.0f64..1000.0, 1..20)) {
            let col = CategoricalColumn::from_frequencies(0, 0, &freq);
            let raw: f64 = col.probability_mass.iter().sum();
            let log: f64 = col.log_probability_mass.iter().sum();
            prop_assert!((raw - 1.0).abs() < 1e-9);
            prop_assert!((log - 1.0).abs() < 1e-9);
        }

        #[test]
        fn test_layout_offsets_contiguous(widths in prop::collection::vec(1usize..6, 1..6)) {
            let total: usize = widths.iter().sum();
            let mut columns = Vec::new();
            let mut offset = 0;
            for w in &widths {
                columns.push(CategoricalColumn::from_frequencies(offset, offset, &vec![1.0; *w]));
                offset += w;
            }
            let layout = ColumnLayout::new(columns, total).unwrap();
            prop_assert_eq!(layout.n_options(), total);
            prop_assert_eq!(layout.n_columns(), widths.len());
        }
    }
}
