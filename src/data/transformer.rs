//! Reversible encoding of prepared rows into the generator space.
//!
//! Categorical columns become one-hot softmax spans. Numeric columns are
//! min-max scaled into a single tanh span. Mixed columns get a tanh span for
//! their continuous part followed by a softmax span over their modes, with
//! one extra slot meaning "not a mode".

use ndarray::{Array2, ArrayView1};

use super::prep::ColumnTypes;
use crate::condvec::{ColumnLayout, OutputSpan, SpanActivation};
use crate::{Error, Result};

const MODE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
enum ColumnEncoding {
    Categorical { categories: usize },
    Mixed { modes: Vec<f64>, range: Range },
    Continuous { range: Range },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min.is_finite() && max.is_finite() {
            Self { min, max }
        } else {
            Self { min: 0.0, max: 0.0 }
        }
    }

    fn scale(self, v: f64) -> f32 {
        if self.max > self.min {
            (2.0 * (v - self.min) / (self.max - self.min) - 1.0).clamp(-1.0, 1.0) as f32
        } else {
            0.0
        }
    }

    fn unscale(self, v: f32) -> f64 {
        let v = f64::from(v.clamp(-1.0, 1.0));
        (v + 1.0) / 2.0 * (self.max - self.min) + self.min
    }
}

fn mode_index(modes: &[f64], v: f64) -> Option<usize> {
    modes.iter().position(|m| (m - v).abs() < MODE_TOLERANCE)
}

fn argmax(values: ArrayView1<'_, f32>) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map_or(0, |(i, _)| i)
}

/// Fitted encoder between prepared values and the transformed space
#[derive(Debug, Clone, PartialEq)]
pub struct DataTransformer {
    encodings: Vec<ColumnEncoding>,
    output_info: Vec<OutputSpan>,
}

impl DataTransformer {
    /// Fit per-column encodings on prepared values
    pub fn fit(values: &Array2<f64>, types: &ColumnTypes) -> Result<Self> {
        let mut encodings = Vec::with_capacity(values.ncols());
        let mut output_info = Vec::new();

        for (col, column) in values.columns().into_iter().enumerate() {
            let encoding = if types.is_categorical(col) {
                let max_code = column.iter().copied().fold(0.0_f64, f64::max);
                let categories = max_code.round() as usize + 1;
                output_info.push(OutputSpan::softmax(categories));
                ColumnEncoding::Categorical { categories }
            } else if let Some(modes) = types.mixed.get(&col) {
                let range = Range::fit(column.iter().copied().filter(|&v| mode_index(modes, v).is_none()));
                output_info.push(OutputSpan::tanh(1));
                output_info.push(OutputSpan::softmax(modes.len() + 1));
                ColumnEncoding::Mixed { modes: modes.clone(), range }
            } else {
                output_info.push(OutputSpan::tanh(1));
                ColumnEncoding::Continuous { range: Range::fit(column.iter().copied()) }
            };
            encodings.push(encoding);
        }

        if output_info.is_empty() {
            return Err(Error::Data("cannot fit a transformer on zero columns".into()));
        }
        Ok(Self { encodings, output_info })
    }

    /// Encode prepared rows
    pub fn transform(&self, values: &Array2<f64>) -> Result<Array2<f32>> {
        if values.ncols() != self.encodings.len() {
            return Err(Error::Data(format!(
                "transformer fitted on {} columns, got {}",
                self.encodings.len(),
                values.ncols()
            )));
        }

        let mut out = Array2::zeros((values.nrows(), self.output_dim()));
        for (r, row) in values.rows().into_iter().enumerate() {
            let mut offset = 0;
            for (col, encoding) in self.encodings.iter().enumerate() {
                let v = row[col];
                match encoding {
                    ColumnEncoding::Categorical { categories } => {
                        let code = v.round();
                        if code < 0.0 || code as usize >= *categories {
                            return Err(Error::Data(format!(
                                "row {r} column {col}: category code {v} outside 0..{categories}"
                            )));
                        }
                        out[[r, offset + code as usize]] = 1.0;
                        offset += categories;
                    }
                    ColumnEncoding::Mixed { modes, range } => {
                        match mode_index(modes, v) {
                            Some(m) => out[[r, offset + 1 + m]] = 1.0,
                            None => {
                                out[[r, offset]] = range.scale(v);
                                out[[r, offset + 1 + modes.len()]] = 1.0;
                            }
                        }
                        offset += modes.len() + 2;
                    }
                    ColumnEncoding::Continuous { range } => {
                        out[[r, offset]] = range.scale(v);
                        offset += 1;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Decode transformed rows back to prepared values
    pub fn inverse_transform(&self, data: &Array2<f32>) -> Result<Array2<f64>> {
        if data.ncols() != self.output_dim() {
            return Err(Error::Data(format!(
                "expected {} transformed columns, got {}",
                self.output_dim(),
                data.ncols()
            )));
        }

        let mut out = Array2::zeros((data.nrows(), self.encodings.len()));
        for (r, row) in data.rows().into_iter().enumerate() {
            let mut offset = 0;
            for (col, encoding) in self.encodings.iter().enumerate() {
                out[[r, col]] = match encoding {
                    ColumnEncoding::Categorical { categories } => {
                        let span = row.slice(ndarray::s![offset..offset + categories]);
                        offset += categories;
                        argmax(span) as f64
                    }
                    ColumnEncoding::Mixed { modes, range } => {
                        let width = modes.len() + 1;
                        let choice = argmax(row.slice(ndarray::s![offset + 1..offset + 1 + width]));
                        let value = modes.get(choice).copied().unwrap_or_else(|| range.unscale(row[offset]));
                        offset += width + 1;
                        value
                    }
                    ColumnEncoding::Continuous { range } => {
                        offset += 1;
                        range.unscale(row[offset - 1])
                    }
                };
            }
        }
        Ok(out)
    }

    /// Span description of the transformed row
    #[must_use]
    pub fn output_info(&self) -> &[OutputSpan] {
        &self.output_info
    }

    /// Width of a transformed row
    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.output_info.iter().map(|s| s.width).sum()
    }

    /// Number of softmax spans (categorical blocks)
    #[must_use]
    pub fn n_categorical_spans(&self) -> usize {
        self.output_info.iter().filter(|s| s.activation == SpanActivation::Softmax).count()
    }

    /// Conditioning layout of already transformed data
    pub fn layout(&self, transformed: &Array2<f32>) -> Result<ColumnLayout> {
        ColumnLayout::from_transformed(transformed, &self.output_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::collections::BTreeMap;

    fn types() -> ColumnTypes {
        let mut mixed = BTreeMap::new();
        mixed.insert(2, vec![0.0]);
        ColumnTypes { categorical: vec![0], mixed, ..Default::default() }
    }

    fn values() -> Array2<f64> {
        // categorical | continuous | mixed(mode 0.0)
        array![
            [0.0, 10.0, 0.0],
            [2.0, 20.0, 5.0],
            [1.0, 30.0, 15.0],
            [2.0, 15.0, 0.0],
        ]
    }

    #[test]
    fn test_output_info_shapes() {
        let t = DataTransformer::fit(&values(), &types()).unwrap();
        assert_eq!(
            t.output_info(),
            &[
                OutputSpan::softmax(3),
                OutputSpan::tanh(1),
                OutputSpan::tanh(1),
                OutputSpan::softmax(2)
            ]
        );
        assert_eq!(t.output_dim(), 7);
        assert_eq!(t.n_categorical_spans(), 2);
    }

    #[test]
    fn test_transform_encodes_rows() {
        let t = DataTransformer::fit(&values(), &types()).unwrap();
        let x = t.transform(&values()).unwrap();

        assert_eq!(x.row(0).to_vec(), vec![1.0, 0.0, 0.0, -1.0, 0.0, 1.0, 0.0]);
        assert_eq!(x.row(2).to_vec(), vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        assert_abs_diff_eq!(x[[1, 4]], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_inverse_transform_roundtrip() {
        let t = DataTransformer::fit(&values(), &types()).unwrap();
        let back = t.inverse_transform(&t.transform(&values()).unwrap()).unwrap();

        for (a, b) in back.iter().zip(values().iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        let t = DataTransformer::fit(&values(), &types()).unwrap();
        let bad = array![[5.0, 10.0, 0.0]];
        assert!(matches!(t.transform(&bad), Err(Error::Data(_))));
    }

    #[test]
    fn test_inverse_clamps_continuous() {
        let t = DataTransformer::fit(&values(), &types()).unwrap();
        let mut x = t.transform(&values()).unwrap();
        x[[0, 3]] = 4.0;
        let back = t.inverse_transform(&x).unwrap();
        assert_abs_diff_eq!(back[[0, 1]], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_layout_from_transformer() {
        let t = DataTransformer::fit(&values(), &types()).unwrap();
        let x = t.transform(&values()).unwrap();
        let layout = t.layout(&x).unwrap();

        assert_eq!(layout.n_columns(), 2);
        assert_eq!(layout.n_options(), 5);
        assert_eq!(layout.columns()[1].data_offset, 5);
        assert_abs_diff_eq!(layout.columns()[0].probability_mass[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let t = DataTransformer::fit(&array![[3.0], [3.0]], &ColumnTypes::default()).unwrap();
        let x = t.transform(&array![[3.0]]).unwrap();
        assert_eq!(x[[0, 0]], 0.0);
    }
}
