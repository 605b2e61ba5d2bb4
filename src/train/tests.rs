//! End-to-end tests for the detector step

use super::*;
use crate::autograd::backward;
use crate::config::DetectorConfig;
use crate::fusion::FusionMode;
use crate::Tensor;

const DIM: usize = 6;

fn config(threshold_mode: bool, synchrony: bool) -> DetectorConfig {
    let mut config = DetectorConfig::default();
    config.model.embed_dim = DIM;
    config.fusion.threshold_mode = threshold_mode;
    config.training.synchrony = synchrony;
    config
}

fn row(seed: usize, sign: f32) -> Tensor {
    Tensor::from_vec(
        (0..DIM).map(|i| sign * (1.0 + ((seed * 7 + i * 3) % 5) as f32 * 0.1)).collect(),
        false,
    )
}

/// Genuine samples point one way, fake samples the other
fn outputs(labels: &[u8]) -> EncoderOutput {
    let rows: Vec<Tensor> = labels
        .iter()
        .enumerate()
        .map(|(i, &l)| row(i, if l == 0 { 1.0 } else { -1.0 }))
        .collect();
    EncoderOutput {
        fused: rows.clone(),
        visual_cross: rows.clone(),
        audio_cross: rows.clone(),
        visual: rows.clone(),
        audio: rows,
    }
}

/// Passes the raw video rows through as every embedding
struct PassThrough;

impl Encoder for PassThrough {
    fn embed(
        &self,
        video: &[Tensor],
        _audio: &[Tensor],
        _padding_mask: &[Vec<bool>],
    ) -> crate::Result<EncoderOutput> {
        Ok(EncoderOutput {
            fused: video.to_vec(),
            visual_cross: video.to_vec(),
            audio_cross: video.to_vec(),
            visual: video.to_vec(),
            audio: video.to_vec(),
        })
    }
}

struct Failing;

impl Encoder for Failing {
    fn embed(&self, _: &[Tensor], _: &[Tensor], _: &[Vec<bool>]) -> crate::Result<EncoderOutput> {
        Err(crate::Error::Encoder("backbone unavailable".into()))
    }
}

fn batch(labels: &[u8]) -> AvBatch {
    let rows = outputs(labels).visual;
    AvBatch::new(
        rows.clone(),
        rows,
        vec![vec![false; 3]; labels.len()],
        BatchLabels::uniform(labels.to_vec()),
    )
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut bad = config(false, false);
    bad.model.r_fake = 0.95;
    assert!(matches!(Detector::new(bad), Err(crate::Error::Validation(_))));
}

#[test]
fn test_step_shapes_for_every_phase() {
    let detector = Detector::new(config(false, false)).expect("valid config");
    let labels = [0u8, 1, 1, 0, 1];
    for phase in [Phase::Train, Phase::Validate, Phase::Test] {
        let result = detector.step(phase, &batch(&labels), &PassThrough).expect("step");
        assert_eq!(result.phase(), phase);
        assert_eq!(result.predictions().len(), labels.len());
        assert_eq!(result.scores().len(), labels.len());
        assert_eq!(result.targets(), &labels);
        assert_eq!(result.fusion_mode(), FusionMode::Learned);
        assert!(result.scores().iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(result.loss_value().is_finite());
    }
}

#[test]
fn test_only_training_records_a_graph() {
    let detector = Detector::new(config(false, true)).expect("valid config");
    let labels = [0u8, 1];
    let train = detector.step(Phase::Train, &batch(&labels), &PassThrough).expect("step");
    let test = detector.step(Phase::Test, &batch(&labels), &PassThrough).expect("step");
    assert!(train.loss().backward_op().is_some());
    assert!(test.loss().backward_op().is_none());
}

#[test]
fn test_loss_is_sum_of_components() {
    for (threshold_mode, synchrony) in [(false, false), (false, true), (true, false), (true, true)] {
        let detector = Detector::new(config(threshold_mode, synchrony)).expect("valid config");
        let labels = BatchLabels::uniform(vec![1, 0, 1]);
        let result = detector
            .forward_losses(&outputs(&labels.multimodal), &labels, Phase::Validate)
            .expect("forward");
        let components = result.components();
        assert_eq!(components.synchrony.is_some(), synchrony);
        approx::assert_relative_eq!(result.loss_value(), components.total(), epsilon = 1e-4);
    }
}

#[test]
fn test_single_class_batches_have_finite_losses() {
    for threshold_mode in [false, true] {
        let detector = Detector::new(config(threshold_mode, true)).expect("valid config");
        for class in [0u8, 1] {
            let labels = BatchLabels::uniform(vec![class; 4]);
            let result = detector
                .forward_losses(&outputs(&labels.multimodal), &labels, Phase::Train)
                .expect("forward");
            let c = result.components();
            assert!(c.audio.is_finite() && c.visual.is_finite() && c.fusion.is_finite());
            assert!(result.loss_value().is_finite());
        }
    }
}

#[test]
fn test_threshold_mode_scores_are_vote_averages() {
    let detector = Detector::new(config(true, false)).expect("valid config");
    let result = detector.step(Phase::Test, &batch(&[0, 1, 0]), &PassThrough).expect("step");
    assert_eq!(result.fusion_mode(), FusionMode::Threshold);
    for (&score, &prediction) in result.scores().iter().zip(result.predictions()) {
        assert_eq!(prediction == 1, score > 0.5);
    }
}

#[test]
fn test_gradient_descent_reduces_loss() {
    let mut detector = Detector::new(config(false, true)).expect("valid config");
    let labels = BatchLabels::uniform(vec![0, 1, 0, 1, 1, 0]);
    let embeddings = outputs(&labels.multimodal);

    let mut losses = Vec::new();
    for _ in 0..30 {
        let mut result = detector
            .forward_losses(&embeddings, &labels, Phase::Train)
            .expect("forward");
        losses.push(result.loss_value());
        backward(result.loss_mut(), None);

        for param in detector.parameters_mut() {
            if let Some(grad) = param.grad() {
                *param.data_mut() -= &(grad * 0.01);
            }
        }
        detector.zero_grad();
    }

    let first = losses[0];
    let last = losses[losses.len() - 1];
    assert!(last < first, "loss should decrease: {first} -> {last}");
}

#[test]
fn test_parameters_cover_every_component() {
    let learned = Detector::new(config(false, false)).expect("valid config");
    // 2 centres + head (2 weights, 2 biases) + fusion layer (weight, bias)
    assert_eq!(learned.parameters().len(), 8);

    let threshold = Detector::new(config(true, false)).expect("valid config");
    assert_eq!(threshold.parameters().len(), 6);
    assert!(threshold.parameters().iter().all(|p| p.requires_grad()));
}

#[test]
fn test_same_seed_same_scores() {
    let a = Detector::new(config(false, false)).expect("valid config");
    let b = Detector::new(config(false, false)).expect("valid config");
    let labels = [1u8, 0];
    let ra = a.step(Phase::Test, &batch(&labels), &PassThrough).expect("step");
    let rb = b.step(Phase::Test, &batch(&labels), &PassThrough).expect("step");
    assert_eq!(ra.scores(), rb.scores());
}

#[test]
fn test_contract_violations_are_errors() {
    let detector = Detector::new(config(false, false)).expect("valid config");

    let err = detector.step(Phase::Train, &batch(&[]), &PassThrough).unwrap_err();
    assert!(matches!(err, crate::Error::Batch(BatchError::Empty)));

    let mut misaligned = batch(&[0, 1]);
    misaligned.labels.audio = vec![0];
    let err = detector.step(Phase::Train, &misaligned, &PassThrough).unwrap_err();
    assert!(matches!(err, crate::Error::Batch(BatchError::Misaligned { .. })));

    let mut wide = batch(&[0, 1]);
    wide.video[1] = Tensor::zeros(DIM + 1, false);
    let err = detector.step(Phase::Validate, &wide, &PassThrough).unwrap_err();
    assert!(matches!(err, crate::Error::Batch(BatchError::EmbeddingWidth { index: 1, .. })));

    let err = detector.step(Phase::Test, &batch(&[0]), &Failing).unwrap_err();
    assert!(matches!(err, crate::Error::Encoder(_)));
}
