//! Epoch-end metric aggregation

use super::{
    auroc, complement, compute_eer, AccumulatorError, BinaryConfusion, EpochAccumulator, Gather,
    LossSync, MetricError,
};
use crate::fusion::FusionMode;
use crate::train::{as_f32, Phase, StepRecord, StepResult};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// EER of an epoch, or why it could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EqualErrorRate {
    Defined { rate: f32, threshold: f32 },
    /// One of the score distributions was empty
    Undefined { real: usize, fake: usize },
}

impl EqualErrorRate {
    pub fn rate(&self) -> Option<f32> {
        match self {
            Self::Defined { rate, .. } => Some(*rate),
            Self::Undefined { .. } => None,
        }
    }
}

/// F1, recall, and precision for one choice of positive class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityMetrics {
    pub f1: f32,
    pub recall: f32,
    pub precision: f32,
}

impl From<&BinaryConfusion> for PolarityMetrics {
    fn from(cm: &BinaryConfusion) -> Self {
        Self { f1: cm.f1(), recall: cm.recall(), precision: cm.precision() }
    }
}

/// Metrics for one epoch over every gathered sample
///
/// `real` holds the metrics on predictions and targets as recorded; `fake`
/// holds the same metrics on their logical complement. Accuracy and AUROC
/// are unchanged by complementing predictions and targets together, so
/// `accuracy` and `auroc` serve both polarities and `fake` carries only the
/// three metrics that differ. `auroc` ranks the binary predictions,
/// `score_auroc` the continuous scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub phase: Phase,
    pub fusion_mode: FusionMode,
    pub num_steps: usize,
    pub num_samples: usize,
    /// Size-weighted mean of step losses
    pub loss: f32,
    pub accuracy: f32,
    pub auroc: Option<f32>,
    pub score_auroc: Option<f32>,
    pub real: PolarityMetrics,
    pub fake: PolarityMetrics,
    pub eer: EqualErrorRate,
    pub confusion: BinaryConfusion,
}

impl EpochMetrics {
    /// Compute every epoch metric from the full set of records
    pub fn from_records(phase: Phase, records: &[StepRecord]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Err(AccumulatorError::EmptyEpoch.into());
        };
        let fusion_mode = first.mode;
        if let Some(other) = records.iter().find(|r| r.mode != fusion_mode) {
            return Err(AccumulatorError::MixedFusionModes {
                expected: fusion_mode,
                found: other.mode,
            }
            .into());
        }

        let mut predictions = Vec::new();
        let mut targets = Vec::new();
        let mut scores = Vec::new();
        let mut weighted_loss = 0.0f64;
        for record in records {
            check_record(record)?;
            predictions.extend(as_f32(&record.predictions));
            targets.extend(as_f32(&record.targets));
            scores.extend_from_slice(&record.scores);
            weighted_loss += f64::from(record.loss) * record.batch_size as f64;
        }

        let num_samples = targets.len();
        if num_samples == 0 {
            return Err(AccumulatorError::EmptyEpoch.into());
        }

        let confusion = BinaryConfusion::from_labels(&predictions, &targets)?;
        let flipped =
            BinaryConfusion::from_labels(&complement(&predictions)?, &complement(&targets)?)?;

        let (fake_scores, real_scores): (Vec<(f32, f32)>, Vec<(f32, f32)>) = scores
            .iter()
            .copied()
            .zip(targets.iter().copied())
            .partition(|&(_, t)| t == 1.0);
        let fake_scores: Vec<f32> = fake_scores.into_iter().map(|(s, _)| s).collect();
        let real_scores: Vec<f32> = real_scores.into_iter().map(|(s, _)| s).collect();

        let eer = match compute_eer(&fake_scores, &real_scores) {
            Ok(eer) => EqualErrorRate::Defined { rate: eer.rate, threshold: eer.threshold },
            Err(MetricError::EmptyDistribution { real, fake }) => {
                tracing::warn!(%phase, real, fake, "EER undefined: one score distribution is empty");
                EqualErrorRate::Undefined { real, fake }
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            phase,
            fusion_mode,
            num_steps: records.len(),
            num_samples,
            loss: (weighted_loss / num_samples as f64) as f32,
            accuracy: confusion.accuracy(),
            auroc: auroc(&predictions, &targets),
            score_auroc: auroc(&scores, &targets),
            real: PolarityMetrics::from(&confusion),
            fake: PolarityMetrics::from(&flipped),
            eer,
            confusion,
        })
    }
}

fn check_record(record: &StepRecord) -> std::result::Result<(), MetricError> {
    let targets = record.targets.len();
    for (field, len) in [
        ("predictions", record.predictions.len()),
        ("scores", record.scores.len()),
        ("batch_size", record.batch_size),
    ] {
        if len != targets {
            return Err(MetricError::RecordFieldMismatch { field, len, targets });
        }
    }
    Ok(())
}

fn fmt_opt(value: Option<f32>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

impl fmt::Display for EpochMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} epoch ({:?} fusion): {} samples in {} steps",
            self.phase, self.fusion_mode, self.num_samples, self.num_steps
        )?;
        writeln!(f, "  loss:        {:.4}", self.loss)?;
        writeln!(f, "  accuracy:    {:.4}", self.accuracy)?;
        writeln!(f, "  auroc:       {}", fmt_opt(self.auroc))?;
        writeln!(f, "  score auroc: {}", fmt_opt(self.score_auroc))?;
        match self.eer {
            EqualErrorRate::Defined { rate, threshold } => {
                writeln!(f, "  eer:         {rate:.4} (threshold {threshold:.4})")?
            }
            EqualErrorRate::Undefined { real, fake } => {
                writeln!(f, "  eer:         undefined ({real} real, {fake} fake)")?
            }
        }
        writeln!(f)?;
        writeln!(f, "            precision    recall  f1-score")?;
        for (name, m) in [("real", &self.real), ("fake", &self.fake)] {
            writeln!(f, "{name:>8}  {:>10.4}{:>10.4}{:>10.4}", m.precision, m.recall, m.f1)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.confusion)
    }
}

/// Collects step records through an epoch and turns them into metrics
///
/// ```
/// use veraz::eval::{EpochAggregator, LocalGather};
/// use veraz::fusion::FusionMode;
/// use veraz::train::{Phase, StepRecord};
///
/// let mut aggregator = EpochAggregator::new();
/// aggregator.push_record(StepRecord {
///     loss: 0.4,
///     batch_size: 4,
///     predictions: vec![1, 1, 0, 0],
///     targets: vec![1, 1, 0, 0],
///     scores: vec![0.9, 0.8, 0.2, 0.7],
///     mode: FusionMode::Learned,
/// })?;
///
/// let metrics = aggregator.finish(Phase::Validate, &LocalGather)?;
/// assert_eq!(metrics.accuracy, 1.0);
/// assert_eq!(metrics.eer.rate(), Some(0.0));
///
/// // a finished epoch must be reset before reuse
/// assert!(aggregator.finish(Phase::Validate, &LocalGather).is_err());
/// aggregator.reset();
/// # Ok::<(), veraz::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct EpochAggregator {
    accumulator: EpochAccumulator,
}

impl EpochAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: &StepResult) -> Result<()> {
        self.push_record(result.record())
    }

    pub fn push_record(&mut self, record: StepRecord) -> Result<()> {
        Ok(self.accumulator.push(record)?)
    }

    pub fn accumulator(&self) -> &EpochAccumulator {
        &self.accumulator
    }

    /// Drain the epoch, gather it from every worker, and compute metrics.
    ///
    /// Calling this again before [`EpochAggregator::reset`] is an error.
    pub fn finish<G>(&mut self, phase: Phase, gather: &G) -> Result<EpochMetrics>
    where
        G: Gather + ?Sized,
    {
        // a failed drain is still exchanged so peers do not wait on this rank
        let local = self.accumulator.drain().map_err(Error::from);
        let records = gather.exchange(local)?;
        let metrics = EpochMetrics::from_records(phase, &records)?;

        tracing::info!(
            target: "veraz::epoch",
            %phase,
            sync = ?LossSync::Gathered,
            world_size = gather.world_size(),
            samples = metrics.num_samples,
            loss = metrics.loss,
            acc = metrics.accuracy,
            auroc = ?metrics.auroc,
            eer = ?metrics.eer.rate(),
            real_f1 = metrics.real.f1,
            fake_f1 = metrics.fake.f1,
            "epoch complete"
        );

        Ok(metrics)
    }

    /// Begin the next epoch
    pub fn reset(&mut self) {
        self.accumulator.reset();
    }
}
