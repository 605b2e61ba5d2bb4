//! Fusion of the unimodal scores with the multimodal logit
//!
//! Two mutually exclusive policies, selected once from configuration:
//!
//! | mode        | final score                                | scale        |
//! |-------------|--------------------------------------------|--------------|
//! | `Learned`   | softmax probability of the fake class      | `[0, 1]`     |
//! | `Threshold` | `(vote_v + vote_a + av_logit) / 3`          | unbounded    |
//!
//! Scores from different modes are not comparable, so every step record
//! carries the mode that produced it.

mod learned;
mod synchrony;
mod threshold;

pub use learned::LearnedFusion;
pub use synchrony::SynchronyLoss;
pub use threshold::{remap, threshold_vote, ThresholdFusion, Thresholds};

use crate::autograd::Context;
use crate::config::{FusionSpec, ValidationError};
use crate::model::{ParamInit, ScorerOutput};
use crate::Tensor;
use serde::{Deserialize, Serialize};

/// Which fusion policy produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMode {
    Learned,
    Threshold,
}

impl FusionMode {
    pub fn from_spec(spec: &FusionSpec) -> Self {
        if spec.threshold_mode {
            FusionMode::Threshold
        } else {
            FusionMode::Learned
        }
    }
}

/// Per-batch signals consumed by fusion, row-aligned
#[derive(Debug, Clone, Copy)]
pub struct FusionInputs<'a> {
    pub visual: &'a ScorerOutput,
    pub audio: &'a ScorerOutput,
    /// Raw multimodal head logits, two per sample
    pub av_logits: &'a [Tensor],
    /// Multimodal labels
    pub labels: &'a [u8],
}

/// Fused decision for a batch
#[derive(Debug, Clone)]
pub struct FusionOutput {
    pub loss: Tensor,
    pub predictions: Vec<u8>,
    pub scores: Vec<f32>,
}

/// The configured fusion policy
#[derive(Debug, Clone)]
pub enum FusionEngine {
    Learned(LearnedFusion),
    Threshold(ThresholdFusion),
}

impl FusionEngine {
    /// Build the policy selected by `spec.threshold_mode`
    pub fn from_spec(spec: &FusionSpec, init: &mut ParamInit) -> Result<Self, ValidationError> {
        if spec.threshold_mode {
            Ok(Self::Threshold(ThresholdFusion::new(Thresholds::from_spec(spec)?)))
        } else {
            Ok(Self::Learned(LearnedFusion::new(init)))
        }
    }

    pub fn mode(&self) -> FusionMode {
        match self {
            Self::Learned(_) => FusionMode::Learned,
            Self::Threshold(_) => FusionMode::Threshold,
        }
    }

    pub fn fuse(&self, inputs: &FusionInputs<'_>, ctx: &Context) -> FusionOutput {
        match self {
            Self::Learned(fusion) => fusion.fuse(inputs, ctx),
            Self::Threshold(fusion) => fusion.fuse(inputs, ctx),
        }
    }

    /// Learned parameters; threshold fusion has none
    pub fn parameters(&self) -> Vec<&Tensor> {
        match self {
            Self::Learned(fusion) => fusion.parameters(),
            Self::Threshold(_) => Vec::new(),
        }
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match self {
            Self::Learned(fusion) => fusion.parameters_mut(),
            Self::Threshold(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_follows_threshold_flag() {
        let mut init = ParamInit::seeded(0);
        let learned = FusionEngine::from_spec(&FusionSpec::default(), &mut init).expect("learned");
        assert_eq!(learned.mode(), FusionMode::Learned);
        assert_eq!(learned.parameters().len(), 2);

        let spec = FusionSpec { threshold_mode: true, ..FusionSpec::default() };
        let threshold = FusionEngine::from_spec(&spec, &mut init).expect("threshold");
        assert_eq!(threshold.mode(), FusionMode::Threshold);
        assert!(threshold.parameters().is_empty());
    }

    #[test]
    fn test_threshold_mode_without_thresholds_fails() {
        let spec = FusionSpec {
            threshold_mode: true,
            audio_threshold: None,
            ..FusionSpec::default()
        };
        assert!(FusionEngine::from_spec(&spec, &mut ParamInit::seeded(0)).is_err());
    }
}
