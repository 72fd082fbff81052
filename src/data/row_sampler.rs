//! Index of real rows by categorical value.

use ndarray::Array2;
use rand::Rng;

use crate::condvec::ColumnLayout;

/// Row indices of the real data, grouped per categorical column and category
///
/// Lets a stage fetch a real row that satisfies a conditioning selection.
#[derive(Debug, Clone)]
pub struct RealRowSampler {
    by_category: Vec<Vec<Vec<usize>>>,
    n_rows: usize,
}

impl RealRowSampler {
    /// Build the index from transformed data
    #[must_use]
    pub fn new(data: &Array2<f32>, layout: &ColumnLayout) -> Self {
        let by_category = layout
            .columns()
            .iter()
            .map(|col| {
                let mut groups = vec![Vec::new(); col.category_count];
                for (r, row) in data.rows().into_iter().enumerate() {
                    let span = row.slice(ndarray::s![col.data_offset..col.data_offset + col.width]);
                    if let Some(cat) = span.iter().position(|&v| v == 1.0) {
                        groups[cat].push(r);
                    }
                }
                groups
            })
            .collect();
        Self { by_category, n_rows: data.nrows() }
    }

    /// Rows whose `column` takes `category`
    #[must_use]
    pub fn rows_for(&self, column: usize, category: usize) -> &[usize] {
        self.by_category
            .get(column)
            .and_then(|c| c.get(category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A random row whose `column` takes `category`
    ///
    /// `None` when no real row carries that category; the caller decides how
    /// to account for the miss.
    pub fn sample_row<R: Rng>(&self, rng: &mut R, column: usize, category: usize) -> Option<usize> {
        let matching = self.rows_for(column, category);
        (!matching.is_empty()).then(|| matching[rng.random_range(0..matching.len())])
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }
}
