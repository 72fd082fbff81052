//! Stacktab: stacked two-stage synthesis of tabular data
//!
//! A first synthesizer learns the real table under categorical conditioning
//! and produces intermediate rows; a second synthesizer refines those rows.
//! Both stages see exactly the same conditioning for each row because every
//! draw is recorded once and the second stage only replays it.
//!
//! # Modules
//!
//! - [`condvec`]: column layout, conditional-vector sampler and recorder
//! - [`data`]: CSV frames, preparation, reversible transformer
//! - [`synth`]: first and second layer synthesizers
//! - [`pipeline`]: the [`StackedTabGan`](pipeline::StackedTabGan) orchestrator
//! - [`config`]: YAML run specification and CLI types
//! - [`cli`]: command handlers for the `stacktab` binary
//!
//! # Example
//!
//! ```no_run
//! use stacktab::config::{load_config, load_dataset};
//! use stacktab::pipeline::StackedTabGan;
//!
//! let spec = load_config("adult.yaml")?;
//! let frame = load_dataset(&spec)?;
//! let mut gan = StackedTabGan::new(spec, frame);
//! gan.fit()?;
//! let synthetic = gan.generate_samples()?;
//! synthetic.write_csv("synthetic.csv")?;
//! # Ok::<(), stacktab::Error>(())
//! ```

pub mod cli;
pub mod condvec;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod synth;

pub use error::{Error, Result, StageId};
