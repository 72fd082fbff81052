//! Recording wrapper that makes every draw replayable by step number.
//!
//! # Phases
//!
//! ```text
//!   new() ──► Accumulating ──freeze()──► Frozen
//!              sample_* ok                sample_* -> RecorderFrozen
//!              replay ok                  replay ok
//! ```
//!
//! The owning run freezes the recorder once the first stage has finished
//! drawing (end of its training + generation pass during `fit`, end of its
//! generation pass during `generate_samples`). The second stage only ever
//! reads through [`StackedConditionalVectorRecorder::replay`].

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::layout::ColumnLayout;
use super::sampler::{ConditionSource, ConditionalVectorSampler, SamplingPolicy};
use super::selection::ConditioningSelection;
use crate::{Error, Result};

/// Recorder phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderPhase {
    /// New draws are appended
    Accumulating,
    /// Replay only
    Frozen,
}

/// One recorded draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedStep {
    /// Policy the selection was drawn under
    pub policy: SamplingPolicy,
    /// The selection exactly as returned to the caller
    pub selection: ConditioningSelection,
}

/// Append-only, step-indexed log of draws
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedSequence {
    steps: Vec<RecordedStep>,
}

impl RecordedSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the assigned step number
    fn push(&mut self, policy: SamplingPolicy, selection: ConditioningSelection) -> usize {
        self.steps.push(RecordedStep { policy, selection });
        self.steps.len() - 1
    }

    /// Bounds-checked lookup
    pub fn get(&self, step: i64) -> Result<&RecordedStep> {
        usize::try_from(step)
            .ok()
            .and_then(|i| self.steps.get(i))
            .ok_or(Error::StepOutOfRange { step, recorded: self.steps.len() })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordedStep> {
        self.steps.iter()
    }
}

/// Wraps a [`ConditionalVectorSampler`] and records every draw in call order
///
/// One recorder is created per run and shared by both stages: the first
/// stage draws through the `sample_*` entrypoints, the second stage reads the
/// same selections back with [`replay`](Self::replay).
#[derive(Debug)]
pub struct StackedConditionalVectorRecorder {
    sampler: ConditionalVectorSampler,
    sequence: RecordedSequence,
    phase: RecorderPhase,
}

impl StackedConditionalVectorRecorder {
    /// Wrap a sampler with an empty sequence
    #[must_use]
    pub fn new(sampler: ConditionalVectorSampler) -> Self {
        Self { sampler, sequence: RecordedSequence::new(), phase: RecorderPhase::Accumulating }
    }

    /// Convenience constructor for a seeded sampler over `layout`
    pub fn with_seed(layout: ColumnLayout, seed: u64) -> Result<Self> {
        Ok(Self::new(ConditionalVectorSampler::with_seed(layout, seed)?))
    }

    fn record(&mut self, policy: SamplingPolicy) -> Result<ConditioningSelection> {
        if self.phase == RecorderPhase::Frozen {
            return Err(Error::RecorderFrozen { step: self.sequence.len() });
        }
        let selection = self.sampler.sample(policy);
        self.sequence.push(policy, selection.clone());
        Ok(selection)
    }

    /// Draw with the training policy and record it
    pub fn sample_for_training(&mut self) -> Result<ConditioningSelection> {
        self.record(SamplingPolicy::Training)
    }

    /// Draw with the generation policy and record it
    pub fn sample_for_generation(&mut self) -> Result<ConditioningSelection> {
        self.record(SamplingPolicy::Generation)
    }

    /// Return the `step`-th recorded selection unmodified
    pub fn replay(&self, step: i64) -> Result<&ConditioningSelection> {
        self.sequence.get(step).map(|s| &s.selection)
    }

    /// Replay a contiguous window of steps
    pub fn steps(&self, range: Range<usize>) -> Result<Vec<ConditioningSelection>> {
        range
            .map(|i| {
                let step = i64::try_from(i).unwrap_or(i64::MAX);
                self.replay(step).cloned()
            })
            .collect()
    }

    /// Stop accepting draws
    pub fn freeze(&mut self) {
        if self.phase == RecorderPhase::Accumulating {
            tracing::debug!(recorded = self.sequence.len(), "conditional vector recorder frozen");
        }
        self.phase = RecorderPhase::Frozen;
    }

    #[must_use]
    pub fn phase(&self) -> RecorderPhase {
        self.phase
    }

    /// Number of draws recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn sequence(&self) -> &RecordedSequence {
        &self.sequence
    }

    #[must_use]
    pub fn layout(&self) -> &ColumnLayout {
        self.sampler.layout()
    }
}

impl ConditionSource for StackedConditionalVectorRecorder {
    fn sample_for_training(&mut self) -> Result<ConditioningSelection> {
        self.record(SamplingPolicy::Training)
    }

    fn sample_for_generation(&mut self) -> Result<ConditioningSelection> {
        self.record(SamplingPolicy::Generation)
    }

    fn layout(&self) -> &ColumnLayout {
        self.sampler.layout()
    }
}
