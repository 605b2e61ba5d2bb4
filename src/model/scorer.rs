//! One-class angular-margin scorer
//!
//! Each modality owns one learned genuine centre `w`. A sample embedding `x`
//! is compared by cosine similarity; the fake-oriented cosine `c = -cos(x, w)`
//! is the modality's evidence of manipulation:
//!
//! ```text
//! cos   = x̂ · ŵ
//! c     = -cos                 ∈ [-1, 1]
//! score = alpha * c            ∈ [-alpha, alpha], higher = more fake
//! ```
//!
//! Label 0 is genuine, label 1 is fake. The training loss pulls genuine
//! embeddings above `r_real` similarity and pushes fake ones below `r_fake`,
//! see [`OneClassMarginLoss`].

use super::ParamInit;
use crate::autograd::{concat, cosine_similarity, Context};
use crate::train::{check_rows, BatchError, LossFn, OneClassMarginLoss};
use crate::Tensor;

/// Negative slope of the Kaiming gain used for the centre
const CENTER_INIT_SLOPE: f32 = 0.25;

/// Modality a scorer is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Audio,
    Visual,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Audio => "audio",
            Modality::Visual => "visual",
        }
    }
}

/// Output of [`OneClassScorer::score_and_loss`]
#[derive(Debug, Clone)]
pub struct ScorerOutput {
    /// Mean margin loss, differentiable w.r.t. the centre and the embeddings
    pub loss: Tensor,
    /// `alpha * c` per sample, detached
    pub scores: Vec<f32>,
    /// Unscaled fake-oriented cosine `c` per sample, detached
    pub fake_cosines: Vec<f32>,
}

/// One-class authenticity scorer for a single modality
#[derive(Debug, Clone)]
pub struct OneClassScorer {
    modality: Modality,
    center: Tensor,
    loss_fn: OneClassMarginLoss,
}

impl OneClassScorer {
    /// Create a scorer for `embed_dim`-wide embeddings.
    ///
    /// Margins are expected to satisfy `r_fake < r_real`; configuration
    /// validation enforces this before a detector is built.
    pub fn new(
        modality: Modality,
        embed_dim: usize,
        loss_fn: OneClassMarginLoss,
        init: &mut ParamInit,
    ) -> Self {
        let center = init.kaiming_uniform(embed_dim, embed_dim, CENTER_INIT_SLOPE);
        Self { modality, center, loss_fn }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn embed_dim(&self) -> usize {
        self.center.len()
    }

    pub fn alpha(&self) -> f32 {
        self.loss_fn.alpha()
    }

    /// The learned genuine centre
    pub fn center(&self) -> &Tensor {
        &self.center
    }

    pub fn center_mut(&mut self) -> &mut Tensor {
        &mut self.center
    }

    /// Score a batch and compute its margin loss.
    ///
    /// Every sample contributes its own term, so a batch containing a single
    /// class is well defined. An empty batch, a label that is not 0 or 1, or
    /// an embedding of the wrong width is rejected.
    pub fn score_and_loss(
        &self,
        embeddings: &[Tensor],
        labels: &[u8],
        ctx: &Context,
    ) -> Result<ScorerOutput, BatchError> {
        let field = self.modality.as_str();
        if embeddings.is_empty() {
            return Err(BatchError::Empty);
        }
        check_rows(field, embeddings, labels.len(), self.embed_dim())?;
        if let Some(index) = labels.iter().position(|&l| l > 1) {
            return Err(BatchError::NonBinaryLabel { field, index, value: labels[index] });
        }

        let center = ctx.view(&self.center);
        let cosines: Vec<Tensor> = embeddings
            .iter()
            .map(|x| cosine_similarity(&ctx.view(x), &center))
            .collect();
        let cosines = concat(&cosines);

        let targets = Tensor::from_vec(labels.iter().map(|&l| f32::from(l)).collect(), false);
        let loss = self.loss_fn.forward(&cosines, &targets);

        let alpha = self.alpha();
        let fake_cosines: Vec<f32> = cosines.data().iter().map(|&cos| -cos).collect();
        let scores = fake_cosines.iter().map(|&c| alpha * c).collect();

        tracing::trace!(
            modality = field,
            batch = embeddings.len(),
            loss = loss.item(),
            "scored batch"
        );

        Ok(ScorerOutput { loss, scores, fake_cosines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;

    fn scorer(dim: usize) -> OneClassScorer {
        OneClassScorer::new(
            Modality::Audio,
            dim,
            OneClassMarginLoss::new(20.0, 0.9, 0.5),
            &mut ParamInit::seeded(42),
        )
    }

    fn row(values: &[f32]) -> Tensor {
        Tensor::from_vec(values.to_vec(), false)
    }

    #[test]
    fn test_center_embedding_scores_most_genuine() {
        let s = scorer(4);
        let center = s.center().detach();
        let opposite = Tensor::new(center.data() * -1.0, false);

        let out = s
            .score_and_loss(&[center, opposite], &[0, 1], &Context::inference())
            .expect("valid batch");
        assert_relative_eq!(out.scores[0], -20.0, epsilon = 1e-3);
        assert_relative_eq!(out.scores[1], 20.0, epsilon = 1e-3);
        assert_relative_eq!(out.fake_cosines[0], -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_scores_within_alpha() {
        let s = scorer(3);
        let rows = vec![row(&[1.0, 2.0, 3.0]), row(&[-5.0, 0.1, 0.0]), row(&[0.0, 0.0, 0.0])];
        let out = s.score_and_loss(&rows, &[0, 1, 0], &Context::new()).expect("valid batch");
        assert!(out.scores.iter().all(|v| v.abs() <= 20.0 + 1e-4));
        assert!(out.fake_cosines.iter().all(|c| c.abs() <= 1.0 + 1e-6));
    }

    #[test]
    fn test_zero_embedding_is_finite() {
        let s = scorer(3);
        let mut out = s
            .score_and_loss(&[Tensor::zeros(3, true)], &[0], &Context::new())
            .expect("valid batch");
        assert!(out.loss.item().is_finite());
        assert!(out.scores[0].is_finite());
        backward(&mut out.loss, None);
        let grad = s.center().grad().expect("centre gradient");
        assert!(grad.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn test_single_class_batches_are_finite() {
        let s = scorer(3);
        let rows = vec![row(&[1.0, 0.0, 0.0]), row(&[0.0, 1.0, 0.0])];
        for label in [0u8, 1] {
            let out = s
                .score_and_loss(&rows, &[label, label], &Context::new())
                .expect("valid batch");
            assert!(out.loss.item().is_finite());
        }
    }

    #[test]
    fn test_training_records_centre_gradient() {
        let s = scorer(3);
        let rows = vec![row(&[1.0, 0.5, 0.0])];
        let mut out = s.score_and_loss(&rows, &[0], &Context::new()).expect("valid batch");
        backward(&mut out.loss, None);
        assert!(s.center().grad().is_some());
    }

    #[test]
    fn test_inference_records_no_graph() {
        let s = scorer(3);
        let rows = vec![Tensor::from_vec(vec![1.0, 0.5, 0.0], true)];
        let out = s.score_and_loss(&rows, &[0], &Context::inference()).expect("valid batch");
        assert!(!out.loss.requires_grad());
        assert!(out.loss.backward_op().is_none());
    }

    #[test]
    fn test_rejects_contract_violations() {
        let s = scorer(3);
        let ctx = Context::inference();
        assert_eq!(s.score_and_loss(&[], &[], &ctx).unwrap_err(), BatchError::Empty);

        let err = s.score_and_loss(&[row(&[1.0, 2.0])], &[0], &ctx).unwrap_err();
        assert!(matches!(err, BatchError::EmbeddingWidth { index: 0, actual: 2, .. }));

        let err = s.score_and_loss(&[row(&[1.0, 2.0, 3.0])], &[2], &ctx).unwrap_err();
        assert!(matches!(err, BatchError::NonBinaryLabel { index: 0, value: 2, .. }));

        let err = s.score_and_loss(&[row(&[1.0, 2.0, 3.0])], &[0, 1], &ctx).unwrap_err();
        assert!(matches!(err, BatchError::Misaligned { expected: 2, actual: 1, .. }));
    }
}
