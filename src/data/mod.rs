//! Tabular data handling
//!
//! Preparation (cleaning, split, encoding), the reversible transformer into
//! the generator space, and a per-category index of real rows.

mod frame;
mod prep;
mod row_sampler;
mod transformer;

pub use frame::TabularFrame;
pub use prep::{ColumnTypes, DataPrep, MISSING_CATEGORY, MISSING_SENTINEL};
pub use row_sampler::RealRowSampler;
pub use transformer::DataTransformer;
