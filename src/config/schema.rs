//! YAML schema for detector configuration

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Complete detector configuration
///
/// Every section may be omitted; missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Scorer and embedding geometry
    #[serde(default)]
    pub model: ModelSpec,

    /// Fusion policy
    #[serde(default)]
    pub fusion: FusionSpec,

    /// Values handed to the external optimizer and loss assembly
    #[serde(default)]
    pub training: TrainingSpec,
}

/// Scorer and embedding geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Embedding width D shared by every modality
    #[serde(default = "default_embed_dim")]
    pub embed_dim: usize,

    /// Score scale; one-class scores lie in [-alpha, alpha]
    #[serde(default = "default_alpha")]
    pub alpha: f32,

    /// Cosine margin genuine samples are pulled above
    #[serde(default = "default_r_real")]
    pub r_real: f32,

    /// Cosine margin fake samples are pushed below
    #[serde(default = "default_r_fake")]
    pub r_fake: f32,

    /// Seed for parameter initialisation
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            embed_dim: default_embed_dim(),
            alpha: default_alpha(),
            r_real: default_r_real(),
            r_fake: default_r_fake(),
            seed: default_seed(),
        }
    }
}

/// Fusion policy selection and thresholds
///
/// Thresholds that are absent from a YAML file stay unset; enabling
/// `threshold_mode` without all three is rejected by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionSpec {
    /// Use fixed-threshold voting instead of the learned fusion layer
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub threshold_mode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_threshold: Option<f32>,
}

impl Default for FusionSpec {
    fn default() -> Self {
        Self {
            threshold_mode: false,
            audio_threshold: Some(0.5),
            video_threshold: Some(0.5),
            final_threshold: Some(0.5),
        }
    }
}

/// Optimisation-facing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSpec {
    #[serde(default = "default_lr")]
    pub learning_rate: f32,

    #[serde(default = "default_weight_decay")]
    pub weight_decay: f32,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Add the synchrony cross-entropy term to the total loss
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub synchrony: bool,
}

impl Default for TrainingSpec {
    fn default() -> Self {
        Self {
            learning_rate: default_lr(),
            weight_decay: default_weight_decay(),
            batch_size: default_batch_size(),
            synchrony: false,
        }
    }
}

fn default_embed_dim() -> usize {
    768
}

fn default_alpha() -> f32 {
    20.0
}

fn default_r_real() -> f32 {
    0.9
}

fn default_r_fake() -> f32 {
    0.5
}

fn default_seed() -> u64 {
    42
}

fn default_lr() -> f32 {
    2e-4
}

fn default_weight_decay() -> f32 {
    1e-4
}

fn default_batch_size() -> usize {
    32
}
