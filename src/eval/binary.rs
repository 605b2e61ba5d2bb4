//! Binary classification counts and the metrics derived from them

use super::MetricError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical complement of a {0, 1} sequence.
///
/// Defined only for exact binary values; any other value, including
/// continuous scores, is rejected with the index of the first offender.
///
/// ```
/// use veraz::eval::complement;
///
/// assert_eq!(complement(&[1.0, 0.0, 1.0]).unwrap(), vec![0.0, 1.0, 0.0]);
/// assert!(complement(&[0.7]).is_err());
/// ```
pub fn complement(values: &[f32]) -> Result<Vec<f32>, MetricError> {
    ensure_binary(values)?;
    Ok(values.iter().map(|&v| if v == 1.0 { 0.0 } else { 1.0 }).collect())
}

/// Error unless every value is exactly 0 or 1
pub fn ensure_binary(values: &[f32]) -> Result<(), MetricError> {
    match values.iter().position(|&v| v != 0.0 && v != 1.0) {
        Some(index) => Err(MetricError::NonBinary { index, value: values[index] }),
        None => Ok(()),
    }
}

/// Fraction of positions where prediction and target agree
pub fn accuracy(predictions: &[f32], targets: &[f32]) -> f32 {
    if targets.is_empty() {
        return 0.0;
    }
    let correct = predictions.iter().zip(targets).filter(|(p, t)| p == t).count();
    correct as f32 / targets.len() as f32
}

/// 2×2 confusion counts with label 1 as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl BinaryConfusion {
    /// Count binary predictions against binary targets
    pub fn from_labels(predictions: &[f32], targets: &[f32]) -> Result<Self, MetricError> {
        if predictions.len() != targets.len() {
            return Err(MetricError::LengthMismatch {
                predictions: predictions.len(),
                targets: targets.len(),
            });
        }
        ensure_binary(predictions)?;
        ensure_binary(targets)?;

        let mut counts = Self::default();
        for (&pred, &target) in predictions.iter().zip(targets) {
            match (pred == 1.0, target == 1.0) {
                (true, true) => counts.true_positives += 1,
                (true, false) => counts.false_positives += 1,
                (false, false) => counts.true_negatives += 1,
                (false, true) => counts.false_negatives += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Same counts with the positive class swapped
    pub fn swapped(&self) -> Self {
        Self {
            true_positives: self.true_negatives,
            false_positives: self.false_negatives,
            true_negatives: self.true_positives,
            false_negatives: self.false_positives,
        }
    }

    pub fn accuracy(&self) -> f32 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// `tp / (tp + fp)`, 0 when nothing was predicted positive
    pub fn precision(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// `tp / (tp + fn)`, 0 when there are no positive targets
    pub fn recall(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// `2tp / (2tp + fp + fn)`
    pub fn f1(&self) -> f32 {
        ratio(
            2 * self.true_positives,
            2 * self.true_positives + self.false_positives + self.false_negatives,
        )
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

impl fmt::Display for BinaryConfusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;
        writeln!(f, "        Pred 0  Pred 1")?;
        writeln!(f, "True 0{:>8}{:>8}", self.true_negatives, self.false_positives)?;
        writeln!(f, "True 1{:>8}{:>8}", self.false_negatives, self.true_positives)
    }
}
