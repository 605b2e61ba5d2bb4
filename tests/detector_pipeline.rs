//! End-to-end: detector steps feeding the epoch aggregator

use std::thread;
use veraz::autograd::backward;
use veraz::config::DetectorConfig;
use veraz::eval::{
    AccumulatorError, EpochAggregator, EpochMetrics, Gather, LocalGather, ThreadGroup,
};
use veraz::fusion::FusionMode;
use veraz::train::{AvBatch, BatchLabels, Detector, Encoder, EncoderOutput, Phase};
use veraz::{Error, Tensor};

const DIM: usize = 8;

fn config(threshold_mode: bool) -> DetectorConfig {
    let mut config = DetectorConfig::default();
    config.model.embed_dim = DIM;
    config.model.seed = 7;
    config.fusion.threshold_mode = threshold_mode;
    config.training.synchrony = true;
    config
}

/// Uses the video rows as every embedding
struct Identity;

impl Encoder for Identity {
    fn embed(
        &self,
        video: &[Tensor],
        _audio: &[Tensor],
        _padding_mask: &[Vec<bool>],
    ) -> veraz::Result<EncoderOutput> {
        Ok(EncoderOutput {
            fused: video.to_vec(),
            visual_cross: video.to_vec(),
            audio_cross: video.to_vec(),
            visual: video.to_vec(),
            audio: video.to_vec(),
        })
    }
}

fn batch(offset: usize, labels: &[u8]) -> AvBatch {
    let rows: Vec<Tensor> = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let sign = if label == 0 { 1.0 } else { -1.0 };
            let data = (0..DIM)
                .map(|d| sign * (0.5 + ((offset + i) * 5 + d * 3) as f32 % 7.0 * 0.1))
                .collect();
            Tensor::from_vec(data, false)
        })
        .collect();
    AvBatch::new(
        rows.clone(),
        rows,
        vec![vec![false; 4]; labels.len()],
        BatchLabels::uniform(labels.to_vec()),
    )
}

/// Batches owned by one worker; single-class batches included
fn worker_batches(rank: usize) -> Vec<AvBatch> {
    let base = rank * 100;
    vec![
        batch(base, &[0, 1, 0, 1]),
        batch(base + 10, &[1, 1, 1]),
        batch(base + 20, &[0, 0]),
    ]
}

fn run_worker<G: Gather + ?Sized>(
    batches: &[AvBatch],
    phase: Phase,
    gather: &G,
) -> veraz::Result<EpochMetrics> {
    let detector = Detector::new(config(false))?;
    let mut aggregator = EpochAggregator::new();
    for batch in batches {
        let step = detector.step(phase, batch, &Identity)?;
        aggregator.push(&step)?;
    }
    aggregator.finish(phase, gather)
}

#[test]
fn test_validate_epoch_over_local_gather() {
    let metrics = run_worker(&worker_batches(0), Phase::Validate, &LocalGather).unwrap();

    assert_eq!(metrics.phase, Phase::Validate);
    assert_eq!(metrics.fusion_mode, FusionMode::Learned);
    assert_eq!(metrics.num_steps, 3);
    assert_eq!(metrics.num_samples, 9);
    assert!(metrics.loss.is_finite());
    assert!(metrics.eer.rate().is_some());
    for value in [metrics.accuracy, metrics.real.f1, metrics.fake.f1] {
        assert!((0.0..=1.0).contains(&value));
    }
}

#[test]
fn test_gathered_epoch_matches_single_worker() {
    let group = ThreadGroup::new(2);
    let handles: Vec<_> = group
        .into_iter()
        .enumerate()
        .map(|(rank, gather)| {
            thread::spawn(move || run_worker(&worker_batches(rank), Phase::Test, &gather))
        })
        .collect();
    let per_worker: Vec<EpochMetrics> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked").expect("worker failed"))
        .collect();

    let mut all_batches = worker_batches(0);
    all_batches.extend(worker_batches(1));
    let single = run_worker(&all_batches, Phase::Test, &LocalGather).unwrap();

    assert_eq!(single.num_samples, 18);
    for metrics in &per_worker {
        assert_eq!(metrics, &single);
    }
}

#[test]
fn test_threshold_mode_epoch() {
    let detector = Detector::new(config(true)).unwrap();
    let mut aggregator = EpochAggregator::new();
    for batch in worker_batches(0) {
        let step = detector.step(Phase::Test, &batch, &Identity).unwrap();
        assert!(step.components().synchrony.is_some());
        aggregator.push(&step).unwrap();
    }
    let metrics = aggregator.finish(Phase::Test, &LocalGather).unwrap();
    assert_eq!(metrics.fusion_mode, FusionMode::Threshold);
    assert_eq!(metrics.num_samples, 9);
}

#[test]
fn test_mixed_modes_rejected() {
    let learned = Detector::new(config(false)).unwrap();
    let threshold = Detector::new(config(true)).unwrap();
    let b = batch(0, &[0, 1]);

    let mut aggregator = EpochAggregator::new();
    aggregator.push(&learned.step(Phase::Validate, &b, &Identity).unwrap()).unwrap();
    let err = aggregator
        .push(&threshold.step(Phase::Validate, &b, &Identity).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Accumulator(AccumulatorError::MixedFusionModes { .. })
    ));
}

#[test]
fn test_training_epochs_with_reset() {
    let mut detector = Detector::new(config(false)).unwrap();
    let mut aggregator = EpochAggregator::new();
    let batches = worker_batches(0);

    let mut epoch_losses = Vec::new();
    for _epoch in 0..2 {
        for batch in &batches {
            detector.zero_grad();
            let mut step = detector.step(Phase::Train, batch, &Identity).unwrap();
            backward(step.loss_mut(), None);
            for param in detector.parameters_mut() {
                if let Some(grad) = param.grad() {
                    *param.data_mut() -= &(grad * 0.01);
                }
            }
            aggregator.push(&step).unwrap();
        }
        let metrics = aggregator.finish(Phase::Train, &LocalGather).unwrap();
        epoch_losses.push(metrics.loss);

        // drained until reset
        let late = detector.step(Phase::Train, &batches[0], &Identity).unwrap();
        assert!(matches!(
            aggregator.push(&late),
            Err(Error::Accumulator(AccumulatorError::AlreadyDrained))
        ));
        aggregator.reset();
    }

    assert_eq!(epoch_losses.len(), 2);
    assert!(epoch_losses.iter().all(|l| l.is_finite()));
}
