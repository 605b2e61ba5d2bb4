//! Fixed-threshold voting fusion
//!
//! Each unimodal fake-oriented cosine `c ∈ [-1, 1]` is remapped to
//! `(c + 1) / 2 ∈ [0, 1]` and binarised against its modality threshold. The
//! multimodal positive-class logit is used directly as the third vote:
//!
//! ```text
//! score      = (vote_v + vote_a + av_logit) / 3
//! prediction = score > final_threshold
//! train loss = BCEWithLogits((remap_v + remap_a + av_logit) / 3, label)
//! ```
//!
//! The score is not a probability: the logit term is unbounded.

use super::{FusionInputs, FusionOutput};
use crate::autograd::{add, concat, scale, select, Context};
use crate::config::{FusionSpec, ValidationError};
use crate::train::{BCEWithLogitsLoss, LossFn};
use crate::Tensor;

/// Decision thresholds for threshold fusion
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Thresholds {
    pub audio: f32,
    pub video: f32,
    pub decision: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { audio: 0.5, video: 0.5, decision: 0.5 }
    }
}

impl Thresholds {
    /// Thresholds from a fusion config section; every value must be set
    pub fn from_spec(spec: &FusionSpec) -> Result<Self, ValidationError> {
        Ok(Self {
            audio: spec
                .audio_threshold
                .ok_or(ValidationError::MissingThreshold("audio_threshold"))?,
            video: spec
                .video_threshold
                .ok_or(ValidationError::MissingThreshold("video_threshold"))?,
            decision: spec
                .final_threshold
                .ok_or(ValidationError::MissingThreshold("final_threshold"))?,
        })
    }
}

/// `(c + 1) / 2`
pub fn remap(fake_cosine: f32) -> f32 {
    (fake_cosine + 1.0) / 2.0
}

/// Vote on one sample from remapped unimodal values and the multimodal logit.
///
/// Returns the pre-threshold average and the prediction. The comparison is
/// strict, so an average equal to the decision threshold predicts genuine.
pub fn threshold_vote(visual: f32, audio: f32, av_logit: f32, thresholds: &Thresholds) -> (f32, u8) {
    let vote_v = if visual > thresholds.video { 1.0 } else { 0.0 };
    let vote_a = if audio > thresholds.audio { 1.0 } else { 0.0 };
    let average = (vote_v + vote_a + av_logit) / 3.0;
    (average, u8::from(average > thresholds.decision))
}

/// Threshold-voting fusion policy
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdFusion {
    thresholds: Thresholds,
}

impl ThresholdFusion {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub(crate) fn fuse(&self, inputs: &FusionInputs<'_>, ctx: &Context) -> FusionOutput {
        let n = inputs.labels.len();
        let mut train_values = Vec::with_capacity(n);
        let mut predictions = Vec::with_capacity(n);
        let mut scores = Vec::with_capacity(n);

        for i in 0..n {
            let remap_v = remap(inputs.visual.fake_cosines[i]);
            let remap_a = remap(inputs.audio.fake_cosines[i]);
            let av_logit = select(&ctx.view(&inputs.av_logits[i]), 1);

            let unimodal = Tensor::scalar((remap_v + remap_a) / 3.0, false);
            train_values.push(add(&scale(&av_logit, 1.0 / 3.0), &unimodal));

            let (score, prediction) =
                threshold_vote(remap_v, remap_a, av_logit.item(), &self.thresholds);
            scores.push(score);
            predictions.push(prediction);
        }

        let targets = Tensor::from_vec(inputs.labels.iter().map(|&l| f32::from(l)).collect(), false);
        let loss = BCEWithLogitsLoss.forward(&concat(&train_values), &targets);

        FusionOutput { loss, predictions, scores }
    }
}
