//! Stacked synthesizer stages.
//!
//! Both stages are conditional statistical generators over the transformed
//! space. The first layer learns per-condition category frequencies and
//! continuous moments by drawing training selections; the second layer learns
//! a per-condition correction that maps first-layer rows toward the real rows
//! under the exact conditions they were generated with.
//!
//! ```text
//! DataPrep ──► FirstLayerSynthesizer ──► intermediate rows
//!                     ▲                        │
//!                     │ draws                  ▼
//!         StackedConditionalVectorRecorder ──► SecondLayerSynthesizer
//!                               replay(step)
//! ```

mod config;
mod first_layer;
mod moments;
mod noise;
mod second_layer;
mod stats;

pub use config::StageConfig;
pub use first_layer::FirstLayerSynthesizer;
pub use noise::LatentNoise;
pub use second_layer::SecondLayerSynthesizer;
pub use stats::{StageStats, StepSummary};

use crate::condvec::{OutputSpan, SpanActivation};

/// Data offsets of every tanh (continuous) dimension
pub(crate) fn tanh_offsets(output_info: &[OutputSpan]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut offset = 0;
    for span in output_info {
        if span.activation == SpanActivation::Tanh {
            offsets.extend(offset..offset + span.width);
        }
        offset += span.width;
    }
    offsets
}
