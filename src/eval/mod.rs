//! Evaluation metrics and epoch aggregation
//!
//! Metrics are computed from the [`StepRecord`](crate::train::StepRecord)s a
//! phase produces. Per-step accuracy and AUROC are cheap online estimates;
//! epoch metrics are computed once, after every worker's records have been
//! gathered, by [`EpochAggregator::finish`].
//!
//! - `binary`: label complement, accuracy, 2×2 confusion counts
//! - `auroc`: rank-based area under the ROC curve
//! - `eer`: equal error rate by threshold sweep
//! - `accumulator` / `aggregator`: per-epoch record lifecycle and metrics
//! - `gather`: cross-worker all-gather of epoch records

mod accumulator;
mod aggregator;
mod auroc;
mod binary;
mod eer;
mod error;
mod gather;

pub use accumulator::EpochAccumulator;
pub use aggregator::{EpochAggregator, EpochMetrics, EqualErrorRate, PolarityMetrics};
pub use auroc::auroc;
pub use binary::{accuracy, complement, ensure_binary, BinaryConfusion};
pub use eer::{compute_eer, Eer};
pub use error::{AccumulatorError, MetricError};
pub use gather::{Gather, LocalGather, LossSync, ThreadGroup};

/// Compute epoch metrics directly from a complete set of records
pub fn compute_epoch_metrics(
    phase: crate::train::Phase,
    records: &[crate::train::StepRecord],
) -> crate::Result<EpochMetrics> {
    EpochMetrics::from_records(phase, records)
}
