//! Validation error types
//!
//! Defines all validation error variants for detector configuration.

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid embedding dimension: {0} (must be > 0)")]
    InvalidEmbedDim(usize),

    #[error("Invalid score scale alpha: {0} (must be finite and > 0.0)")]
    InvalidAlpha(f32),

    #[error("Invalid margins: r_real={r_real}, r_fake={r_fake} (need -1 <= r_fake < r_real <= 1)")]
    InvalidMargins { r_real: f32, r_fake: f32 },

    #[error("Threshold mode requires {0} to be set")]
    MissingThreshold(&'static str),

    #[error("Invalid {name}: {value} (unimodal thresholds must lie in [0, 1], the final threshold must be finite)")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("Invalid learning rate: {0} (must be finite, > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),
}
