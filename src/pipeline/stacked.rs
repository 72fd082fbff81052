//! Two-stage orchestrator.

use serde::Serialize;

use super::artifact;
use crate::condvec::{ColumnLayout, ConditionalVectorSampler, StackedConditionalVectorRecorder};
use crate::config::StackSpec;
use crate::data::{DataPrep, DataTransformer, TabularFrame};
use crate::error::StageId;
use crate::synth::{FirstLayerSynthesizer, SecondLayerSynthesizer, StageConfig};
use crate::{Error, Result};

/// Counters of the most recent `fit` or `generate_samples` run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Selections held by the run's recorder
    pub recorded_steps: usize,
    /// First step of the generation pass inside the recorder
    pub generation_base: usize,
    /// Rows produced by the first layer
    pub intermediate_rows: usize,
    /// Rows produced by the second layer
    pub final_rows: usize,
}

/// Fitted state shared by generation runs
#[derive(Debug)]
struct Fitted {
    prep: DataPrep,
    transformer: DataTransformer,
    first: FirstLayerSynthesizer,
    second: SecondLayerSynthesizer,
}

/// Stacked tabular synthesizer
///
/// Owns the real dataset and both stages. Each run creates its own recorder
/// which is discarded when the run ends, successfully or not.
#[derive(Debug)]
pub struct StackedTabGan {
    spec: StackSpec,
    frame: TabularFrame,
    fitted: Option<Fitted>,
    runs: u64,
    last_run: Option<RunReport>,
}

impl StackedTabGan {
    #[must_use]
    pub fn new(spec: StackSpec, frame: TabularFrame) -> Self {
        Self { spec, frame, fitted: None, runs: 0, last_run: None }
    }

    #[must_use]
    pub fn spec(&self) -> &StackSpec {
        &self.spec
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Report of the last completed run
    #[must_use]
    pub fn last_run(&self) -> Option<&RunReport> {
        self.last_run.as_ref()
    }

    /// Conditioning layout of the fitted model
    #[must_use]
    pub fn layout(&self) -> Option<&ColumnLayout> {
        self.fitted.as_ref().and_then(|f| f.first.layout())
    }

    /// Seed for the next run, if the spec pins one
    fn next_seed(&mut self) -> Option<u64> {
        let seed = self.spec.training.seed.map(|s| s.wrapping_add(self.runs));
        self.runs += 1;
        seed
    }

    fn stage_config(&self, seed: Option<u64>) -> StageConfig {
        StageConfig { seed, ..self.spec.training.clone() }
    }

    fn prepare(&self, seed: Option<u64>) -> Result<DataPrep> {
        DataPrep::new(&self.frame, &self.spec.data, seed.unwrap_or(0))
            .map_err(|e| e.in_stage(StageId::Preparation))
    }

    /// Train both stages on the real dataset
    ///
    /// The first stage draws training selections, then generates one
    /// intermediate row per real row. The recorder is frozen after that pass
    /// and the second stage trains on each intermediate row paired with the
    /// selection replayed for it.
    pub fn fit(&mut self) -> Result<()> {
        let seed = self.next_seed();
        let n = self.frame.n_rows();
        tracing::info!(rows = n, ?seed, "fit started");

        let first_prep = self.prepare(seed)?;
        let transformer = DataTransformer::fit(first_prep.values(), first_prep.column_types())
            .map_err(|e| e.in_stage(StageId::Preparation))?;
        let layout = transformer
            .transform(first_prep.values())
            .and_then(|data| transformer.layout(&data))
            .map_err(|e| e.in_stage(StageId::Preparation))?;

        let mut recorder = new_recorder(layout, seed).map_err(|e| e.in_stage(StageId::Preparation))?;

        let mut first = FirstLayerSynthesizer::new(self.stage_config(seed));
        first
            .fit(&first_prep, &mut recorder)
            .map_err(|e| e.in_stage(StageId::FirstLayer))?;

        let generation_base = recorder.len();
        let intermediate = first
            .sample(n, &mut recorder)
            .map_err(|e| e.in_stage(StageId::FirstLayer))?;
        recorder.freeze();
        check_rows(StageId::FirstLayer, n, intermediate.nrows())?;
        check_rows(StageId::FirstLayer, n, recorder.len() - generation_base)?;

        if let Some(path) = &self.spec.output.intermediate_data {
            artifact::write_intermediate(path, &intermediate)?;
        }
        if let Some(path) = &self.spec.output.intermediate_conditions {
            artifact::write_conditions(path, recorder.sequence())?;
        }

        let second_prep = self.prepare(seed)?;
        let mut second = SecondLayerSynthesizer::new(self.stage_config(seed));
        second
            .fit(&second_prep, &transformer, &intermediate, &recorder, generation_base)
            .map_err(|e| e.in_stage(StageId::SecondLayer))?;

        let report = RunReport {
            recorded_steps: recorder.len(),
            generation_base,
            intermediate_rows: intermediate.nrows(),
            final_rows: 0,
        };
        tracing::info!(
            recorded = report.recorded_steps,
            generation_base,
            intermediate = report.intermediate_rows,
            "fit finished"
        );

        self.fitted = Some(Fitted { prep: second_prep, transformer, first, second });
        self.last_run = Some(report);
        Ok(())
    }

    /// Generate as many synthetic rows as the real dataset holds
    pub fn generate_samples(&mut self) -> Result<TabularFrame> {
        let seed = self.next_seed();
        let n = self.frame.n_rows();
        let fitted = self.fitted.as_mut().ok_or(Error::NotFitted)?;
        let layout = fitted.first.layout().cloned().ok_or(Error::NotFitted)?;

        let mut recorder = new_recorder(layout, seed)?;
        let intermediate = fitted
            .first
            .sample(n, &mut recorder)
            .map_err(|e| e.in_stage(StageId::FirstLayer))?;
        recorder.freeze();
        check_rows(StageId::FirstLayer, n, intermediate.nrows())?;
        check_rows(StageId::FirstLayer, n, recorder.len())?;

        let refined = fitted
            .second
            .sample(&intermediate, &recorder, 0)
            .map_err(|e| e.in_stage(StageId::SecondLayer))?;
        check_rows(StageId::SecondLayer, n, refined.nrows())?;

        let values = fitted.transformer.inverse_transform(&refined)?;
        let frame = fitted.prep.inverse_prep(&values)?;

        let report = RunReport {
            recorded_steps: recorder.len(),
            generation_base: 0,
            intermediate_rows: intermediate.nrows(),
            final_rows: frame.n_rows(),
        };
        tracing::info!(rows = report.final_rows, recorded = report.recorded_steps, "samples generated");
        self.last_run = Some(report);
        Ok(frame)
    }
}

fn new_recorder(layout: ColumnLayout, seed: Option<u64>) -> Result<StackedConditionalVectorRecorder> {
    match seed {
        Some(seed) => StackedConditionalVectorRecorder::with_seed(layout, seed),
        None => Ok(StackedConditionalVectorRecorder::new(ConditionalVectorSampler::new(layout)?)),
    }
}

fn check_rows(stage: StageId, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::RowCountMismatch { stage, expected, actual })
    }
}
