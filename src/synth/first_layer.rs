//! First-layer synthesizer.
//!
//! A conditional generator trained from conditioning draws: each training
//! selection fetches a matching real row and updates the statistics kept
//! for that (column, category) condition. Generation draws one selection
//! per output row and samples every other block from the learned
//! conditional distribution.

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::StageConfig;
use super::moments::Moments;
use super::noise::LatentNoise;
use super::stats::{StageStats, StepSummary};
use super::tanh_offsets;
use crate::condvec::{ColumnLayout, ConditionSource, ConditionalBatch, ConditioningSelection};
use crate::data::{DataPrep, DataTransformer, RealRowSampler};
use crate::{Error, Result};

/// Statistics of the rows seen under one condition
#[derive(Debug, Clone)]
struct ConditionalCell {
    /// Category counts per categorical column
    counts: Vec<Vec<f64>>,
    /// Moments per continuous dimension
    moments: Vec<Moments>,
}

impl ConditionalCell {
    fn new(layout: &ColumnLayout, n_continuous: usize) -> Self {
        Self {
            counts: layout.columns().iter().map(|c| vec![0.0; c.category_count]).collect(),
            moments: vec![Moments::default(); n_continuous],
        }
    }

    fn observe(&mut self, row: ArrayView1<'_, f32>, layout: &ColumnLayout, continuous: &[usize]) {
        for (j, col) in layout.columns().iter().enumerate() {
            let mut span = (col.data_offset..col.data_offset + col.width).map(|c| row[c]);
            if let Some(cat) = span.position(|v| v == 1.0) {
                self.counts[j][cat] += 1.0;
            }
        }
        for (k, &d) in continuous.iter().enumerate() {
            self.moments[k].push(f64::from(row[d]));
        }
    }
}

#[derive(Debug)]
struct FirstLayerModel {
    transformer: DataTransformer,
    layout: ColumnLayout,
    continuous: Vec<usize>,
    cells: Vec<Vec<ConditionalCell>>,
    marginal: ConditionalCell,
}

impl FirstLayerModel {
    fn generate_row<R: Rng>(
        &self,
        rng: &mut R,
        selection: &ConditioningSelection,
        config: &StageConfig,
    ) -> Vec<f32> {
        let cell = &self.cells[selection.column_index][selection.category_index];
        let mut row = vec![0.0_f32; self.layout.data_width()];

        for (j, col) in self.layout.columns().iter().enumerate() {
            let cat = if j == selection.column_index {
                selection.category_index
            } else {
                draw_category(rng, &cell.counts[j], &self.marginal.counts[j], config.smoothing)
            };
            row[col.data_offset + cat] = 1.0;
        }

        let z = LatentNoise::sample(rng, self.continuous.len());
        let noise = f64::from(config.noise_scale);
        for (k, &d) in self.continuous.iter().enumerate() {
            let m = if cell.moments[k].count() > 0.0 { &cell.moments[k] } else { &self.marginal.moments[k] };
            let sd = (m.std().powi(2) + noise * noise).sqrt();
            row[d] = (m.mean() + sd * f64::from(z.vector[k])).clamp(-1.0, 1.0) as f32;
        }
        row
    }
}

fn draw_category<R: Rng>(rng: &mut R, counts: &[f64], marginal: &[f64], smoothing: f64) -> usize {
    WeightedIndex::new(counts.iter().map(|c| c + smoothing))
        .or_else(|_| WeightedIndex::new(marginal.iter().map(|c| c + 1.0)))
        .map_or(0, |w| w.sample(rng))
}

/// First stage of the stack
#[derive(Debug)]
pub struct FirstLayerSynthesizer {
    /// Configuration
    pub config: StageConfig,
    /// Training statistics
    pub stats: StageStats,
    model: Option<FirstLayerModel>,
    rng: StdRng,
}

impl FirstLayerSynthesizer {
    /// Create an unfitted stage; the noise stream is seeded from `config.seed`
    #[must_use]
    pub fn new(config: StageConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        Self { config, stats: StageStats::default(), model: None, rng }
    }

    /// Train on `prep`, drawing one training selection per mini-batch row
    ///
    /// The stage fits its own transformer on `prep`; the resulting layout must
    /// equal the layout `source` draws against.
    pub fn fit<S: ConditionSource + ?Sized>(&mut self, prep: &DataPrep, source: &mut S) -> Result<()> {
        let transformer = DataTransformer::fit(prep.values(), prep.column_types())?;
        let data = transformer.transform(prep.values())?;
        let layout = transformer.layout(&data)?;
        if &layout != source.layout() {
            return Err(Error::InvalidLayout(
                "first layer layout differs from the conditioning layout".into(),
            ));
        }

        let continuous = tanh_offsets(transformer.output_info());
        let rows = RealRowSampler::new(&data, &layout);

        let mut marginal = ConditionalCell::new(&layout, continuous.len());
        for row in data.rows() {
            marginal.observe(row, &layout, &continuous);
        }
        let mut cells: Vec<Vec<ConditionalCell>> = layout
            .columns()
            .iter()
            .map(|c| vec![ConditionalCell::new(&layout, continuous.len()); c.category_count])
            .collect();

        let steps = self.config.steps_per_epoch(data.nrows());
        for _epoch in 0..self.config.epochs {
            for _ in 0..steps {
                let selections = (0..self.config.batch_size)
                    .map(|_| source.sample_for_training())
                    .collect::<Result<Vec<_>>>()?;
                let batch = ConditionalBatch::from_selections(&selections);

                let mut seen = HashSet::new();
                let mut fallback_rows = 0;
                for (&column, &category) in batch.column_indices.iter().zip(batch.category_indices.iter()) {
                    seen.insert((column, category));
                    match rows.sample_row(&mut self.rng, column, category) {
                        Some(r) => cells[column][category].observe(data.row(r), &layout, &continuous),
                        None => fallback_rows += 1,
                    }
                }
                self.stats.record_step(&StepSummary {
                    draws: batch.len(),
                    distinct_conditions: seen.len(),
                    fallback_rows,
                });
            }
        }

        tracing::info!(
            steps = self.stats.steps,
            draws = self.stats.draws,
            conditions = layout.n_options(),
            "first layer trained"
        );

        self.model = Some(FirstLayerModel { transformer, layout, continuous, cells, marginal });
        Ok(())
    }

    /// Generate `n` transformed rows, drawing one generation selection per row
    pub fn sample<S: ConditionSource + ?Sized>(&mut self, n: usize, source: &mut S) -> Result<Array2<f32>> {
        let model = self.model.as_ref().ok_or(Error::NotFitted)?;
        if source.layout() != &model.layout {
            return Err(Error::InvalidLayout(
                "conditioning layout differs from the fitted first layer".into(),
            ));
        }

        let mut out = Array2::zeros((n, model.layout.data_width()));
        for i in 0..n {
            let sel = source.sample_for_generation()?;
            let row = model.generate_row(&mut self.rng, &sel, &self.config);
            out.row_mut(i).assign(&ArrayView1::from(&row));
        }

        self.stats.rows_generated += n;
        tracing::debug!(rows = n, "first layer generation pass");
        Ok(out)
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Transformer fitted during [`fit`](Self::fit)
    #[must_use]
    pub fn transformer(&self) -> Option<&DataTransformer> {
        self.model.as_ref().map(|m| &m.transformer)
    }

    /// Layout fitted during [`fit`](Self::fit)
    #[must_use]
    pub fn layout(&self) -> Option<&ColumnLayout> {
        self.model.as_ref().map(|m| &m.layout)
    }
}
