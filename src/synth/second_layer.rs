//! Second-layer synthesizer.
//!
//! Refines first-layer rows. Training pairs each intermediate row `i` with the
//! selection replayed at `first_step + i` and learns, per condition, how the
//! continuous dimensions of the intermediate rows differ from the real rows
//! satisfying the same condition. Generation applies that correction to each
//! intermediate row under its own replayed condition.

use std::collections::HashSet;

use ndarray::Array2;

use super::config::StageConfig;
use super::moments::Moments;
use super::stats::{StageStats, StepSummary};
use super::tanh_offsets;
use crate::condvec::{ColumnLayout, ConditioningSelection, StackedConditionalVectorRecorder};
use crate::data::{DataPrep, DataTransformer};
use crate::error::StageId;
use crate::{Error, Result};

const MIN_STD: f64 = 1e-6;

/// Real vs intermediate moments of one continuous dimension
#[derive(Debug, Clone, Copy, Default)]
struct Correction {
    real: Moments,
    synthetic: Moments,
}

impl Correction {
    fn is_usable(&self) -> bool {
        self.real.count() > 0.0 && self.synthetic.count() > 0.0
    }

    fn apply(&self, v: f32) -> f32 {
        let scale = if self.synthetic.std() > MIN_STD && self.real.std() > MIN_STD {
            self.real.std() / self.synthetic.std()
        } else {
            1.0
        };
        let shifted = self.real.mean() + (f64::from(v) - self.synthetic.mean()) * scale;
        shifted.clamp(-1.0, 1.0) as f32
    }
}

#[derive(Debug)]
struct SecondLayerModel {
    layout: ColumnLayout,
    continuous: Vec<usize>,
    /// Per categorical column, per category, per continuous dimension
    corrections: Vec<Vec<Vec<Correction>>>,
    global: Vec<Correction>,
}

fn category_of(row: ndarray::ArrayView1<'_, f32>, offset: usize, width: usize) -> Option<usize> {
    (offset..offset + width).position(|c| row[c] == 1.0)
}

fn step_id(step: usize) -> i64 {
    i64::try_from(step).unwrap_or(i64::MAX)
}

/// Second stage of the stack
#[derive(Debug)]
pub struct SecondLayerSynthesizer {
    /// Configuration
    pub config: StageConfig,
    /// Training statistics
    pub stats: StageStats,
    model: Option<SecondLayerModel>,
}

impl SecondLayerSynthesizer {
    #[must_use]
    pub fn new(config: StageConfig) -> Self {
        Self { config, stats: StageStats::default(), model: None }
    }

    /// Train on `(intermediate[i], replay(first_step + i))` pairs
    ///
    /// Every recorded step from `first_step` on must have a matching
    /// intermediate row. The moment estimates are exact after one pass, so
    /// `config.epochs` is not repeated here; `config.batch_size` only groups
    /// the pass into reported steps.
    pub fn fit(
        &mut self,
        prep: &DataPrep,
        transformer: &DataTransformer,
        intermediate: &Array2<f32>,
        recorder: &StackedConditionalVectorRecorder,
        first_step: usize,
    ) -> Result<()> {
        let expected = recorder.len().saturating_sub(first_step);
        if intermediate.nrows() != expected {
            return Err(Error::RowCountMismatch {
                stage: StageId::SecondLayer,
                expected,
                actual: intermediate.nrows(),
            });
        }

        let real = transformer.transform(prep.values())?;
        let layout = transformer.layout(&real)?;
        if intermediate.ncols() != layout.data_width() {
            return Err(Error::Data(format!(
                "intermediate rows have {} columns, layout expects {}",
                intermediate.ncols(),
                layout.data_width()
            )));
        }

        let continuous = tanh_offsets(transformer.output_info());
        let mut corrections: Vec<Vec<Vec<Correction>>> = layout
            .columns()
            .iter()
            .map(|c| vec![vec![Correction::default(); continuous.len()]; c.category_count])
            .collect();
        let mut global = vec![Correction::default(); continuous.len()];

        for row in real.rows() {
            for (j, col) in layout.columns().iter().enumerate() {
                if let Some(cat) = category_of(row, col.data_offset, col.width) {
                    for (k, &d) in continuous.iter().enumerate() {
                        corrections[j][cat][k].real.push(f64::from(row[d]));
                    }
                }
            }
            for (k, &d) in continuous.iter().enumerate() {
                global[k].real.push(f64::from(row[d]));
            }
        }

        let batch = self.config.batch_size.max(1);
        let mut seen = HashSet::new();
        for (i, row) in intermediate.rows().into_iter().enumerate() {
            let sel = recorder.replay(step_id(first_step + i))?;
            seen.insert((sel.column_index, sel.category_index));
            for (k, &d) in continuous.iter().enumerate() {
                let v = f64::from(row[d]);
                corrections[sel.column_index][sel.category_index][k].synthetic.push(v);
                global[k].synthetic.push(v);
            }
            if (i + 1) % batch == 0 || i + 1 == intermediate.nrows() {
                let draws = (i % batch) + 1;
                self.stats.record_step(&StepSummary {
                    draws,
                    distinct_conditions: seen.len(),
                    fallback_rows: 0,
                });
                seen.clear();
            }
        }

        tracing::info!(
            pairs = intermediate.nrows(),
            first_step,
            steps = self.stats.steps,
            "second layer trained"
        );

        self.model = Some(SecondLayerModel { layout, continuous, corrections, global });
        Ok(())
    }

    /// Refine `intermediate`, conditioning row `i` on `replay(first_step + i)`
    pub fn sample(
        &mut self,
        intermediate: &Array2<f32>,
        recorder: &StackedConditionalVectorRecorder,
        first_step: usize,
    ) -> Result<Array2<f32>> {
        let model = self.model.as_ref().ok_or(Error::NotFitted)?;
        if intermediate.ncols() != model.layout.data_width() {
            return Err(Error::Data(format!(
                "intermediate rows have {} columns, layout expects {}",
                intermediate.ncols(),
                model.layout.data_width()
            )));
        }

        let mut out = intermediate.clone();
        for (i, mut row) in out.rows_mut().into_iter().enumerate() {
            let sel: &ConditioningSelection = recorder.replay(step_id(first_step + i))?;
            let cell = &model.corrections[sel.column_index][sel.category_index];
            for (k, &d) in model.continuous.iter().enumerate() {
                let correction = if cell[k].is_usable() { &cell[k] } else { &model.global[k] };
                if correction.is_usable() {
                    row[d] = correction.apply(row[d]);
                }
            }

            let col = &model.layout.columns()[sel.column_index];
            for c in col.data_offset..col.data_offset + col.width {
                row[c] = 0.0;
            }
            row[col.data_offset + sel.category_index] = 1.0;
        }

        self.stats.rows_generated += out.nrows();
        tracing::debug!(rows = out.nrows(), first_step, "second layer generation pass");
        Ok(out)
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }
}
