//! Statistics tracking for stage training.

use std::collections::VecDeque;

const HISTORY: usize = 100;

/// Result of one training step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSummary {
    /// Conditioning selections consumed by the step
    pub draws: usize,
    /// Distinct (column, category) pairs among those selections
    pub distinct_conditions: usize,
    /// Selections whose category had no matching real row
    pub fallback_rows: usize,
}

/// Running statistics of a stage
#[derive(Debug, Clone)]
pub struct StageStats {
    /// Total training steps
    pub steps: usize,
    /// Total conditioning selections consumed while training
    pub draws: usize,
    /// Rows produced by generation passes
    pub rows_generated: usize,
    /// Distinct conditions per step (recent history)
    pub distinct_history: VecDeque<usize>,
    /// Fallback rows per step (recent history)
    pub fallback_history: VecDeque<usize>,
}

impl Default for StageStats {
    fn default() -> Self {
        Self {
            steps: 0,
            draws: 0,
            rows_generated: 0,
            distinct_history: VecDeque::with_capacity(HISTORY),
            fallback_history: VecDeque::with_capacity(HISTORY),
        }
    }
}

impl StageStats {
    /// Record a training step
    pub fn record_step(&mut self, step: &StepSummary) {
        self.steps += 1;
        self.draws += step.draws;

        if self.distinct_history.len() >= HISTORY {
            self.distinct_history.pop_front();
        }
        self.distinct_history.push_back(step.distinct_conditions);

        if self.fallback_history.len() >= HISTORY {
            self.fallback_history.pop_front();
        }
        self.fallback_history.push_back(step.fallback_rows);
    }

    /// Average distinct conditions per step over recent history
    #[must_use]
    pub fn avg_distinct_conditions(&self) -> f32 {
        if self.distinct_history.is_empty() {
            return 0.0;
        }
        self.distinct_history.iter().sum::<usize>() as f32 / self.distinct_history.len() as f32
    }
}
