//! Side artifacts written during a fit run.

use std::path::Path;

use ndarray::Array2;

use crate::condvec::RecordedSequence;
use crate::data::TabularFrame;
use crate::Result;

/// Header of the recorded-conditions file
pub const CONDITIONS_HEADER: [&str; 4] = ["step", "policy", "column_index", "category_index"];

/// Transformed matrix as a frame with `x0..xN` headers
pub fn intermediate_frame(data: &Array2<f32>) -> Result<TabularFrame> {
    let columns = (0..data.ncols()).map(|i| format!("x{i}")).collect();
    let rows = data
        .rows()
        .into_iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    TabularFrame::new(columns, rows)
}

/// One line per recorded draw, in step order
pub fn conditions_frame(sequence: &RecordedSequence) -> Result<TabularFrame> {
    let columns = CONDITIONS_HEADER.iter().map(|h| (*h).to_string()).collect();
    let rows = sequence
        .iter()
        .enumerate()
        .map(|(step, s)| {
            vec![
                step.to_string(),
                s.policy.to_string(),
                s.selection.column_index.to_string(),
                s.selection.category_index.to_string(),
            ]
        })
        .collect();
    TabularFrame::new(columns, rows)
}

pub fn write_intermediate(path: &Path, data: &Array2<f32>) -> Result<()> {
    intermediate_frame(data)?.write_csv(path)?;
    tracing::info!(path = %path.display(), rows = data.nrows(), "intermediate data written");
    Ok(())
}

pub fn write_conditions(path: &Path, sequence: &RecordedSequence) -> Result<()> {
    conditions_frame(sequence)?.write_csv(path)?;
    tracing::info!(path = %path.display(), steps = sequence.len(), "recorded conditions written");
    Ok(())
}
