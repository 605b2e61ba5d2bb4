//! Boundary to the external audio-visual encoder

use super::{check_rows, BatchError};
use crate::Tensor;

/// Embeddings produced by the encoder for one batch, row-aligned with it
#[derive(Debug, Clone)]
pub struct EncoderOutput {
    /// Fused audio-visual embedding (class token of the cross-modal encoder)
    pub fused: Vec<Tensor>,
    /// Visual features before projection
    pub visual_cross: Vec<Tensor>,
    /// Audio features before projection
    pub audio_cross: Vec<Tensor>,
    /// Projected visual embedding scored by the visual one-class scorer
    pub visual: Vec<Tensor>,
    /// Projected audio embedding scored by the audio one-class scorer
    pub audio: Vec<Tensor>,
}

impl EncoderOutput {
    /// `n` rows of width `embed_dim` in every field
    pub fn validate(&self, n: usize, embed_dim: usize) -> Result<(), BatchError> {
        check_rows("fused", &self.fused, n, embed_dim)?;
        check_rows("visual_cross", &self.visual_cross, n, embed_dim)?;
        check_rows("audio_cross", &self.audio_cross, n, embed_dim)?;
        check_rows("visual", &self.visual, n, embed_dim)?;
        check_rows("audio", &self.audio, n, embed_dim)
    }
}

/// Feature-extraction backbone and cross-modal encoder
///
/// Implementations own every learned parameter upstream of the embeddings.
/// Embeddings that require gradients receive them during a training step.
pub trait Encoder {
    fn embed(
        &self,
        video: &[Tensor],
        audio: &[Tensor],
        padding_mask: &[Vec<bool>],
    ) -> crate::Result<EncoderOutput>;
}
