//! Fit / generate lifecycle of the stacked synthesizer.
//!
//! A run owns exactly one [`StackedConditionalVectorRecorder`](crate::condvec::StackedConditionalVectorRecorder):
//!
//! ```text
//! fit:       [ training draws ........ | generation draws (n) ] -> frozen
//!                                        ^ generation_base
//!            second layer trains on replay(generation_base + i)
//!
//! generate:  [ generation draws (n) ] -> frozen
//!            second layer refines with replay(i)
//! ```

pub mod artifact;
mod stacked;

pub use stacked::{RunReport, StackedTabGan};
