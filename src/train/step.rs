//! Per-step results and their transportable projection

use crate::eval::{accuracy, auroc};
use crate::fusion::FusionMode;
use crate::train::Phase;
use crate::Tensor;
use serde::{Deserialize, Serialize};

/// Scalar value of every loss term of a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossComponents {
    pub audio: f32,
    pub visual: f32,
    pub fusion: f32,
    /// `None` when the synchrony term is disabled
    pub synchrony: Option<f32>,
}

impl LossComponents {
    pub fn total(&self) -> f32 {
        self.audio + self.visual + self.fusion + self.synchrony.unwrap_or(0.0)
    }
}

/// Outcome of one detector step
///
/// Holds the differentiable total loss next to detached per-sample values.
/// Immutable once built; [`StepResult::record`] projects it into a
/// [`StepRecord`] for epoch aggregation.
#[derive(Debug, Clone)]
pub struct StepResult {
    phase: Phase,
    mode: FusionMode,
    loss: Tensor,
    components: LossComponents,
    predictions: Vec<u8>,
    targets: Vec<u8>,
    scores: Vec<f32>,
}

impl StepResult {
    pub(crate) fn new(
        phase: Phase,
        mode: FusionMode,
        loss: Tensor,
        components: LossComponents,
        predictions: Vec<u8>,
        targets: Vec<u8>,
        scores: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(predictions.len(), targets.len());
        debug_assert_eq!(scores.len(), targets.len());
        Self { phase, mode, loss, components, predictions, targets, scores }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fusion_mode(&self) -> FusionMode {
        self.mode
    }

    /// Total loss; carries a graph only in [`Phase::Train`]
    pub fn loss(&self) -> &Tensor {
        &self.loss
    }

    /// Mutable loss handle for running the backward pass
    pub fn loss_mut(&mut self) -> &mut Tensor {
        &mut self.loss
    }

    pub fn loss_value(&self) -> f32 {
        self.loss.item()
    }

    pub fn components(&self) -> &LossComponents {
        &self.components
    }

    pub fn predictions(&self) -> &[u8] {
        &self.predictions
    }

    pub fn targets(&self) -> &[u8] {
        &self.targets
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    pub fn batch_size(&self) -> usize {
        self.targets.len()
    }

    /// Accuracy of this step's predictions alone
    pub fn accuracy(&self) -> f32 {
        accuracy(&as_f32(&self.predictions), &as_f32(&self.targets))
    }

    /// AUROC of this step's predictions alone; `None` for a single-class batch
    pub fn auroc(&self) -> Option<f32> {
        auroc(&as_f32(&self.predictions), &as_f32(&self.targets))
    }

    /// Detached, thread-safe projection for the epoch accumulator
    pub fn record(&self) -> StepRecord {
        StepRecord {
            loss: self.loss_value(),
            batch_size: self.batch_size(),
            predictions: self.predictions.clone(),
            targets: self.targets.clone(),
            scores: self.scores.clone(),
            mode: self.mode,
        }
    }
}

/// What an epoch keeps of a step: plain values that cross worker boundaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub loss: f32,
    pub batch_size: usize,
    pub predictions: Vec<u8>,
    pub targets: Vec<u8>,
    pub scores: Vec<f32>,
    pub mode: FusionMode,
}

pub(crate) fn as_f32(values: &[u8]) -> Vec<f32> {
    values.iter().map(|&v| f32::from(v)).collect()
}
