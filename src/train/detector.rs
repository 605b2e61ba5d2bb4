//! Phase-parameterised detector step

use super::{
    AvBatch, BatchError, BatchLabels, Encoder, EncoderOutput, LossComponents, Phase, StepResult,
};
use crate::autograd::add;
use crate::config::{validate_config, DetectorConfig};
use crate::eval::LossSync;
use crate::fusion::{FusionEngine, FusionInputs, FusionMode, SynchronyLoss};
use crate::model::{Modality, MultimodalHead, OneClassScorer, ParamInit};
use crate::train::OneClassMarginLoss;
use crate::{Result, Tensor};

/// Scoring, fusion, and loss assembly over encoder embeddings
///
/// Owns the two one-class scorers, the multimodal head, and the fusion
/// policy. Parameters are exposed so an external optimizer can update them
/// between steps.
///
/// # Example
///
/// ```
/// use veraz::config::DetectorConfig;
/// use veraz::train::{BatchLabels, Detector, EncoderOutput, Phase};
/// use veraz::Tensor;
///
/// let mut config = DetectorConfig::default();
/// config.model.embed_dim = 4;
/// let detector = Detector::new(config).unwrap();
///
/// let row = |v: f32| Tensor::from_vec(vec![v, 0.5, -0.5, 1.0], false);
/// let outputs = EncoderOutput {
///     fused: vec![row(1.0), row(-1.0)],
///     visual_cross: vec![row(1.0), row(-1.0)],
///     audio_cross: vec![row(1.0), row(-1.0)],
///     visual: vec![row(1.0), row(-1.0)],
///     audio: vec![row(1.0), row(-1.0)],
/// };
/// let labels = BatchLabels::uniform(vec![0, 1]);
///
/// let result = detector.forward_losses(&outputs, &labels, Phase::Test).unwrap();
/// assert_eq!(result.predictions().len(), 2);
/// assert!(result.loss_value().is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
    visual: OneClassScorer,
    audio: OneClassScorer,
    head: MultimodalHead,
    fusion: FusionEngine,
    synchrony: SynchronyLoss,
}

impl Detector {
    /// Validate `config` and initialise every parameter from its seed
    pub fn new(config: DetectorConfig) -> Result<Self> {
        validate_config(&config)?;

        let model = &config.model;
        let margin_loss = OneClassMarginLoss::new(model.alpha, model.r_real, model.r_fake);
        let mut init = ParamInit::seeded(model.seed);

        let visual = OneClassScorer::new(Modality::Visual, model.embed_dim, margin_loss, &mut init);
        let audio = OneClassScorer::new(Modality::Audio, model.embed_dim, margin_loss, &mut init);
        let head = MultimodalHead::new(model.embed_dim, &mut init);
        let fusion = FusionEngine::from_spec(&config.fusion, &mut init)?;
        let synchrony = SynchronyLoss::new(config.training.synchrony);

        tracing::info!(
            embed_dim = model.embed_dim,
            fusion = ?fusion.mode(),
            synchrony = synchrony.is_enabled(),
            "detector initialised"
        );

        Ok(Self { config, visual, audio, head, fusion, synchrony })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn fusion_mode(&self) -> FusionMode {
        self.fusion.mode()
    }

    pub fn visual_scorer(&self) -> &OneClassScorer {
        &self.visual
    }

    pub fn audio_scorer(&self) -> &OneClassScorer {
        &self.audio
    }

    /// Run one step: encode the batch, score, fuse, and assemble the loss.
    ///
    /// Train and validate steps log their loss, accuracy, and AUROC as soon
    /// as they complete. These values describe the local batch only and are
    /// never averaged across workers.
    pub fn step<E>(&self, phase: Phase, batch: &AvBatch, encoder: &E) -> Result<StepResult>
    where
        E: Encoder + ?Sized,
    {
        batch.validate()?;
        let outputs = encoder.embed(&batch.video, &batch.audio, &batch.padding_mask)?;
        let result = self.forward_losses(&outputs, &batch.labels, phase)?;

        if phase.logs_online() {
            log_step(&result);
        }
        Ok(result)
    }

    /// Scoring and fusion half of [`Detector::step`] for callers that
    /// already hold embeddings
    pub fn forward_losses(
        &self,
        outputs: &EncoderOutput,
        labels: &BatchLabels,
        phase: Phase,
    ) -> Result<StepResult> {
        if labels.is_empty() {
            return Err(BatchError::Empty.into());
        }
        labels.validate()?;
        outputs.validate(labels.len(), self.config.model.embed_dim)?;

        let ctx = phase.context();
        let visual = self.visual.score_and_loss(&outputs.visual, &labels.visual, &ctx)?;
        let audio = self.audio.score_and_loss(&outputs.audio, &labels.audio, &ctx)?;
        let av_logits = self.head.forward_batch(&outputs.fused, &ctx)?;

        let fused = self.fusion.fuse(
            &FusionInputs {
                visual: &visual,
                audio: &audio,
                av_logits: &av_logits,
                labels: &labels.multimodal,
            },
            &ctx,
        );
        let synchrony = self.synchrony.compute(&av_logits, &labels.synchrony);

        let components = LossComponents {
            audio: audio.loss.item(),
            visual: visual.loss.item(),
            fusion: fused.loss.item(),
            synchrony: synchrony.as_ref().map(Tensor::item),
        };

        let mut loss = add(&add(&audio.loss, &visual.loss), &fused.loss);
        if let Some(synchrony) = &synchrony {
            loss = add(&loss, synchrony);
        }

        Ok(StepResult::new(
            phase,
            self.fusion.mode(),
            loss,
            components,
            fused.predictions,
            labels.multimodal.clone(),
            fused.scores,
        ))
    }

    /// Every learned tensor, in a stable order
    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params = vec![self.visual.center(), self.audio.center()];
        params.extend(self.head.parameters());
        params.extend(self.fusion.parameters());
        params
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = vec![self.visual.center_mut(), self.audio.center_mut()];
        params.extend(self.head.parameters_mut());
        params.extend(self.fusion.parameters_mut());
        params
    }

    /// Clear accumulated gradients on every parameter
    pub fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }
}

fn log_step(result: &StepResult) {
    let phase = result.phase().as_str();
    let loss = result.loss_value();
    let components = result.components();
    let acc = result.accuracy();
    let auroc = result.auroc();

    match result.phase() {
        Phase::Validate => tracing::debug!(
            target: "veraz::step",
            phase,
            sync = ?LossSync::Local,
            loss,
            fusion_loss = components.fusion,
            acc,
            auroc = ?auroc,
            re = acc + auroc.unwrap_or(f32::NAN),
            "step"
        ),
        _ => tracing::debug!(
            target: "veraz::step",
            phase,
            sync = ?LossSync::Local,
            loss,
            fusion_loss = components.fusion,
            acc,
            auroc = ?auroc,
            "step"
        ),
    }
}
