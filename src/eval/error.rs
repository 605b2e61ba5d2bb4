//! Evaluation error types

use crate::fusion::FusionMode;

/// Input-contract violation in an epoch metric
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("value {value} at index {index} is not a binary label")]
    NonBinary { index: usize, value: f32 },

    #[error("{predictions} predictions but {targets} targets")]
    LengthMismatch { predictions: usize, targets: usize },

    /// A per-sample field of a step record disagrees with its target count
    #[error("record has {len} {field} for {targets} targets")]
    RecordFieldMismatch { field: &'static str, len: usize, targets: usize },

    #[error("EER undefined: {real} real and {fake} fake scores")]
    EmptyDistribution { real: usize, fake: usize },
}

/// Misuse of the epoch accumulator lifecycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccumulatorError {
    #[error("epoch already drained; call reset() before reusing the accumulator")]
    AlreadyDrained,

    #[error("epoch holds no samples")]
    EmptyEpoch,

    #[error("records from {expected:?} and {found:?} fusion in one epoch")]
    MixedFusionModes { expected: FusionMode, found: FusionMode },
}
