//! Crate-wide error type

use crate::config::ValidationError;
use crate::eval::{AccumulatorError, MetricError};
use crate::train::BatchError;
use std::path::PathBuf;

/// Result type alias for veraz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by scoring, fusion, and evaluation.
///
/// Batch-level errors abort the batch; none of them is recovered inside the
/// crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid batch: {0}")]
    Batch(#[from] BatchError),

    #[error("Metric computation failed: {0}")]
    Metric(#[from] MetricError),

    #[error("Epoch accumulator misuse: {0}")]
    Accumulator(#[from] AccumulatorError),

    #[error("Encoder failed: {0}")]
    Encoder(String),

    #[error("Cross-worker gather failed: {0}")]
    Gather(String),

    #[error("Record parsing failed: {0}")]
    Records(#[from] serde_json::Error),
}

impl Error {
    /// Create an IO error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
