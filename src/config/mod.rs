//! Declarative YAML configuration
//!
//! A run is described by a single YAML file:
//!
//! ```yaml
//! data:
//!   path: Adult.csv
//!   test_ratio: 0.2
//!   categorical_columns: [workclass, education, income]
//!   log_columns: []
//!   mixed_columns:
//!     capital-loss: [0.0]
//!   integer_columns: [age]
//!   problem_type:
//!     classification: income
//! training:
//!   epochs: 1
//!   batch_size: 500
//!   seed: 42
//! output:
//!   intermediate_data: out/intermediate.csv
//!   intermediate_conditions: out/conditions.csv
//!   synthetic: out/synthetic.csv
//! ```

mod cli;
mod loader;
mod schema;
mod validate;

pub use cli::{
    apply_overrides, parse_args, Cli, Command, FitArgs, LayoutArgs, OutputFormat, ValidateArgs,
};
pub use loader::{load_config, load_dataset};
pub use schema::{DataSpec, OutputSpec, ProblemType, StackSpec};
pub use validate::{validate_config, ValidationError};
