//! Optional synchrony auxiliary loss

use crate::train::CrossEntropyLoss;
use crate::Tensor;

/// Cross-entropy of the raw multimodal logits against the synchrony label.
///
/// When disabled no graph is recorded for the term at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SynchronyLoss {
    enabled: bool,
}

impl SynchronyLoss {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn compute(&self, av_logits: &[Tensor], labels: &[u8]) -> Option<Tensor> {
        self.enabled.then(|| CrossEntropyLoss.batch_mean(av_logits, labels))
    }
}
