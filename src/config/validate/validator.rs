//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::{DetectorConfig, FusionSpec};

/// Validate a detector configuration
///
/// Checks:
/// - Geometry and margins are in range
/// - Threshold mode has every threshold it needs
/// - Optimizer-facing values are sane
pub fn validate_config(config: &DetectorConfig) -> Result<(), ValidationError> {
    let model = &config.model;
    if model.embed_dim == 0 {
        return Err(ValidationError::InvalidEmbedDim(model.embed_dim));
    }

    if !model.alpha.is_finite() || model.alpha <= 0.0 {
        return Err(ValidationError::InvalidAlpha(model.alpha));
    }

    let margins_ok = (-1.0..=1.0).contains(&model.r_fake)
        && (-1.0..=1.0).contains(&model.r_real)
        && model.r_fake < model.r_real;
    if !margins_ok {
        return Err(ValidationError::InvalidMargins {
            r_real: model.r_real,
            r_fake: model.r_fake,
        });
    }

    if config.fusion.threshold_mode {
        validate_thresholds(&config.fusion)?;
    }

    let training = &config.training;
    if !training.learning_rate.is_finite()
        || training.learning_rate <= 0.0
        || training.learning_rate > 1.0
    {
        return Err(ValidationError::InvalidLearningRate(training.learning_rate));
    }

    if training.weight_decay.is_nan() || training.weight_decay < 0.0 {
        return Err(ValidationError::InvalidWeightDecay(training.weight_decay));
    }

    if training.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(training.batch_size));
    }

    Ok(())
}

/// Unimodal thresholds compare remapped cosines in `[0, 1]`; outside that
/// range a vote can never change. The final threshold is compared against a
/// vote average that includes an unbounded logit, so it only has to be finite.
fn validate_thresholds(fusion: &FusionSpec) -> Result<(), ValidationError> {
    for (name, value, unit_range) in [
        ("audio_threshold", fusion.audio_threshold, true),
        ("video_threshold", fusion.video_threshold, true),
        ("final_threshold", fusion.final_threshold, false),
    ] {
        let Some(v) = value else {
            return Err(ValidationError::MissingThreshold(name));
        };
        let in_range = if unit_range { (0.0..=1.0).contains(&v) } else { v.is_finite() };
        if !in_range {
            return Err(ValidationError::InvalidThreshold { name, value: v });
        }
    }
    Ok(())
}
