//! Configuration types for synthesizer stages.

use serde::{Deserialize, Serialize};

/// Hyperparameters shared by both stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Passes over the data while training
    pub epochs: usize,
    /// Conditioning draws per training step
    pub batch_size: usize,
    /// Standard deviation of the latent noise added to continuous outputs
    pub noise_scale: f32,
    /// Pseudo-count added to every conditional category count
    pub smoothing: f64,
    /// Base seed; unset means OS entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            batch_size: 500,
            noise_scale: 0.05,
            smoothing: 1.0,
            seed: None,
        }
    }
}

impl StageConfig {
    /// Number of training steps per epoch for `rows` rows
    #[must_use]
    pub fn steps_per_epoch(&self, rows: usize) -> usize {
        rows.div_ceil(self.batch_size.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_config_default() {
        let config = StageConfig::default();
        assert_eq!(config.epochs, 1);
        assert_eq!(config.batch_size, 500);
        assert!(config.noise_scale > 0.0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_steps_per_epoch() {
        let config = StageConfig { batch_size: 16, ..Default::default() };
        assert_eq!(config.steps_per_epoch(50), 4);
        assert_eq!(config.steps_per_epoch(48), 3);
        assert_eq!(config.steps_per_epoch(0), 1);
    }
}
