//! Conditioning selections and their batched form.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::layout::ColumnLayout;

/// One conditioning draw: "produce a row where column C takes category V"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditioningSelection {
    /// One-hot over the concatenated category space
    pub vector: Vec<f32>,
    /// One-hot over the categorical columns
    pub mask: Vec<f32>,
    /// Index of the selected categorical column
    pub column_index: usize,
    /// Index of the selected category within that column
    pub category_index: usize,
}

impl ConditioningSelection {
    /// Encode a `(column, category)` pair against a layout
    ///
    /// # Panics
    ///
    /// Panics if the pair lies outside the layout.
    #[must_use]
    pub fn encode(layout: &ColumnLayout, column_index: usize, category_index: usize) -> Self {
        let column = &layout.columns()[column_index];
        assert!(
            category_index < column.category_count,
            "category {category_index} out of range for column {column_index}"
        );

        let mut vector = vec![0.0; layout.n_options()];
        vector[column.start_offset + category_index] = 1.0;

        let mut mask = vec![0.0; layout.n_columns()];
        mask[column_index] = 1.0;

        Self { vector, mask, column_index, category_index }
    }

    /// Position of the hot entry in `vector`
    #[must_use]
    pub fn hot_option(&self) -> Option<usize> {
        self.vector.iter().position(|&v| v == 1.0)
    }
}

/// Row-stacked selections for one mini-batch
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBatch {
    /// `(batch, n_options)` conditioning vectors
    pub vectors: Array2<f32>,
    /// `(batch, n_columns)` column masks
    pub masks: Array2<f32>,
    /// Selected column per row
    pub column_indices: Array1<usize>,
    /// Selected category per row
    pub category_indices: Array1<usize>,
}

impl ConditionalBatch {
    /// Stack selections drawn against the same layout
    #[must_use]
    pub fn from_selections(selections: &[ConditioningSelection]) -> Self {
        let n_options = selections.first().map_or(0, |s| s.vector.len());
        let n_columns = selections.first().map_or(0, |s| s.mask.len());

        let mut vectors = Array2::zeros((selections.len(), n_options));
        let mut masks = Array2::zeros((selections.len(), n_columns));
        for (i, sel) in selections.iter().enumerate() {
            vectors.row_mut(i).assign(&Array1::from(sel.vector.clone()));
            masks.row_mut(i).assign(&Array1::from(sel.mask.clone()));
        }

        Self {
            vectors,
            masks,
            column_indices: selections.iter().map(|s| s.column_index).collect(),
            category_indices: selections.iter().map(|s| s.category_index).collect(),
        }
    }

    /// Number of rows in the batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.column_indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
