//! Detector configuration: YAML schema, validation, loading, CLI arguments

mod cli;
mod loader;
mod schema;
mod validate;

pub use cli::{parse_args, Cli, Command, EvaluateArgs, OutputFormat, ValidateArgs};
pub use loader::load_config;
pub use schema::{DetectorConfig, FusionSpec, ModelSpec, TrainingSpec};
pub use validate::{validate_config, ValidationError};
