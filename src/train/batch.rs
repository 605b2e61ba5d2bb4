//! Audio-visual batch and its input contract

use crate::Tensor;

/// Input-contract violation for one batch
///
/// Raised before any loss is computed; the batch is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("batch is empty")]
    Empty,

    #[error("{field} has {actual} rows, expected {expected}")]
    Misaligned {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field}[{index}] has width {actual}, expected {expected}")]
    EmbeddingWidth {
        field: &'static str,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{field}[{index}] = {value} is not a binary label")]
    NonBinaryLabel {
        field: &'static str,
        index: usize,
        value: u8,
    },
}

/// Check that `rows` holds `expected` rows, each `width` wide
pub fn check_rows(
    field: &'static str,
    rows: &[Tensor],
    expected: usize,
    width: usize,
) -> Result<(), BatchError> {
    if rows.len() != expected {
        return Err(BatchError::Misaligned { field, expected, actual: rows.len() });
    }
    match rows.iter().position(|row| row.len() != width) {
        Some(index) => Err(BatchError::EmbeddingWidth {
            field,
            index,
            expected: width,
            actual: rows[index].len(),
        }),
        None => Ok(()),
    }
}

/// Independent binary labels per sample, one vector per axis
///
/// `0` is genuine (or in sync), `1` is fake (or out of sync). `multimodal` is
/// the ground truth the final decision is judged against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchLabels {
    pub visual: Vec<u8>,
    pub audio: Vec<u8>,
    pub content: Vec<u8>,
    pub multimodal: Vec<u8>,
    pub synchrony: Vec<u8>,
}

impl BatchLabels {
    /// Every axis set to the same label vector
    pub fn uniform(labels: Vec<u8>) -> Self {
        Self {
            visual: labels.clone(),
            audio: labels.clone(),
            content: labels.clone(),
            synchrony: labels.clone(),
            multimodal: labels,
        }
    }

    pub fn len(&self) -> usize {
        self.multimodal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multimodal.is_empty()
    }

    fn axes(&self) -> [(&'static str, &[u8]); 5] {
        [
            ("visual_label", self.visual.as_slice()),
            ("audio_label", self.audio.as_slice()),
            ("content_label", self.content.as_slice()),
            ("multimodal_label", self.multimodal.as_slice()),
            ("synchrony_label", self.synchrony.as_slice()),
        ]
    }

    /// Every axis aligned to the multimodal labels and valued in {0, 1}
    pub fn validate(&self) -> Result<(), BatchError> {
        let expected = self.len();
        for (field, labels) in self.axes() {
            if labels.len() != expected {
                return Err(BatchError::Misaligned { field, expected, actual: labels.len() });
            }
            if let Some(index) = labels.iter().position(|&l| l > 1) {
                return Err(BatchError::NonBinaryLabel { field, index, value: labels[index] });
            }
        }
        Ok(())
    }
}

/// One batch of raw audio-visual inputs and labels
///
/// The raw `video`/`audio` rows are opaque to the core; they are handed to
/// the [`Encoder`](super::Encoder) unchanged.
#[derive(Debug, Clone)]
pub struct AvBatch {
    pub video: Vec<Tensor>,
    pub audio: Vec<Tensor>,
    pub padding_mask: Vec<Vec<bool>>,
    pub labels: BatchLabels,
}

impl AvBatch {
    pub fn new(
        video: Vec<Tensor>,
        audio: Vec<Tensor>,
        padding_mask: Vec<Vec<bool>>,
        labels: BatchLabels,
    ) -> Self {
        Self { video, audio, padding_mask, labels }
    }

    /// Number of samples
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Non-empty, row-aligned, binary-labelled
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.labels.is_empty() {
            return Err(BatchError::Empty);
        }
        self.labels.validate()?;
        let expected = self.size();
        for (field, actual) in [
            ("video", self.video.len()),
            ("audio", self.audio.len()),
            ("padding_mask", self.padding_mask.len()),
        ] {
            if actual != expected {
                return Err(BatchError::Misaligned { field, expected, actual });
            }
        }
        Ok(())
    }
}
