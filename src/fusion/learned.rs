//! Learned-classifier fusion
//!
//! Stacks `[visual_score, audio_score, av_logit]` per sample and maps it
//! through a `Linear(3, 2)` layer. The unimodal scores arrive detached and
//! alpha-scaled; only the multimodal logit carries gradient back into the
//! head. The final score is the softmax probability of the fake class.

use super::{FusionInputs, FusionOutput};
use crate::autograd::{concat, select, softmax_values, Context};
use crate::model::{Linear, ParamInit, NUM_CLASSES};
use crate::train::CrossEntropyLoss;
use crate::Tensor;

/// Number of stacked fusion features
const FUSION_FEATURES: usize = 3;

/// Learned fusion layer over the three detector signals
#[derive(Debug, Clone)]
pub struct LearnedFusion {
    layer: Linear,
}

impl LearnedFusion {
    pub fn new(init: &mut ParamInit) -> Self {
        Self { layer: Linear::new(FUSION_FEATURES, NUM_CLASSES, init) }
    }

    /// Two fusion logits per sample
    pub fn logits(&self, inputs: &FusionInputs<'_>, ctx: &Context) -> Vec<Tensor> {
        (0..inputs.labels.len())
            .map(|i| {
                let features = concat(&[
                    Tensor::scalar(inputs.visual.scores[i], false),
                    Tensor::scalar(inputs.audio.scores[i], false),
                    select(&ctx.view(&inputs.av_logits[i]), 1),
                ]);
                self.layer.forward(&features, ctx)
            })
            .collect()
    }

    pub(crate) fn fuse(&self, inputs: &FusionInputs<'_>, ctx: &Context) -> FusionOutput {
        let logits = self.logits(inputs, ctx);
        let loss = CrossEntropyLoss.batch_mean(&logits, inputs.labels);

        let (predictions, scores): (Vec<u8>, Vec<f32>) = logits
            .iter()
            .map(|row| {
                let probs = softmax_values(row.data());
                // argmax with ties to the genuine class
                (u8::from(probs[1] > probs[0]), probs[1])
            })
            .unzip();

        FusionOutput { loss, predictions, scores }
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        self.layer.parameters()
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layer.parameters_mut()
    }
}
