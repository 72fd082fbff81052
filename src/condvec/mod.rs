//! Conditional vector subsystem
//!
//! Samples which categorical value each synthetic row should represent,
//! encodes it for a generator, and records it so a second stage can be
//! conditioned on exactly the same sequence.
//!
//! # Architecture
//!
//! ```text
//! DataTransformer ──► ColumnLayout ──► ConditionalVectorSampler
//!                                              │
//!                                              ▼
//!                          StackedConditionalVectorRecorder
//!                          │  sample_for_training / sample_for_generation
//!                          │  (first stage draws, appended in call order)
//!                          ▼
//!                          replay(step)  (second stage reads)
//! ```
//!
//! # Example
//!
//! ```rust
//! use stacktab::condvec::{CategoricalColumn, ColumnLayout, StackedConditionalVectorRecorder};
//!
//! let column = CategoricalColumn::from_frequencies(0, 0, &[95.0, 5.0]);
//! let layout = ColumnLayout::new(vec![column], 2)?;
//! let mut recorder = StackedConditionalVectorRecorder::with_seed(layout, 42)?;
//!
//! let drawn = recorder.sample_for_generation()?;
//! recorder.freeze();
//! assert_eq!(recorder.replay(0)?, &drawn);
//! # Ok::<(), stacktab::Error>(())
//! ```

mod layout;
mod recorder;
mod sampler;
mod selection;

pub use layout::{CategoricalColumn, ColumnLayout, OutputSpan, SpanActivation};
pub use recorder::{RecordedSequence, RecordedStep, RecorderPhase, StackedConditionalVectorRecorder};
pub use sampler::{ConditionSource, ConditionalVectorSampler, SamplingPolicy};
pub use selection::{ConditionalBatch, ConditioningSelection};
