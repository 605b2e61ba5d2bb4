//! Multimodal classification head over the fused embedding

use super::{Linear, ParamInit};
use crate::autograd::{relu, Context};
use crate::train::{check_rows, BatchError};
use crate::Tensor;

/// Number of multimodal classes (genuine, fake)
pub const NUM_CLASSES: usize = 2;

/// `Linear(D, D) → ReLU → Linear(D, 2)`
///
/// Produces the two raw multimodal logits per sample. Index 1 is the
/// positive (fake) class logit consumed by fusion; the full pair feeds the
/// synchrony loss.
#[derive(Debug, Clone)]
pub struct MultimodalHead {
    hidden: Linear,
    output: Linear,
}

impl MultimodalHead {
    pub fn new(embed_dim: usize, init: &mut ParamInit) -> Self {
        Self {
            hidden: Linear::new(embed_dim, embed_dim, init),
            output: Linear::new(embed_dim, NUM_CLASSES, init),
        }
    }

    pub fn embed_dim(&self) -> usize {
        self.hidden.in_features()
    }

    /// Logits for one fused embedding
    pub fn forward(&self, fused: &Tensor, ctx: &Context) -> Tensor {
        let h = relu(&self.hidden.forward(&ctx.view(fused), ctx));
        self.output.forward(&h, ctx)
    }

    /// Logits for every row of a batch
    pub fn forward_batch(&self, fused: &[Tensor], ctx: &Context) -> Result<Vec<Tensor>, BatchError> {
        check_rows("fused", fused, fused.len(), self.embed_dim())?;
        Ok(fused.iter().map(|row| self.forward(row, ctx)).collect())
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.hidden.parameters();
        params.extend(self.output.parameters());
        params
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.hidden.parameters_mut();
        params.extend(self.output.parameters_mut());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, select};

    #[test]
    fn test_logit_shape() {
        let head = MultimodalHead::new(4, &mut ParamInit::seeded(1));
        let logits = head
            .forward_batch(&[Tensor::from_vec(vec![0.1, 0.2, 0.3, 0.4], false)], &Context::new())
            .expect("valid rows");
        assert_eq!(logits.len(), 1);
        assert_eq!(logits[0].len(), NUM_CLASSES);
        assert_eq!(head.parameters().len(), 4);
    }

    #[test]
    fn test_gradient_reaches_both_layers() {
        let head = MultimodalHead::new(3, &mut ParamInit::seeded(5));
        let fused = Tensor::from_vec(vec![1.0, -0.5, 2.0], true);
        let mut positive = select(&head.forward(&fused, &Context::new()), 1);
        backward(&mut positive, None);

        let params = head.parameters();
        // output bias: d logit_1 / d b = [0, 1]
        let bias_grad = params[3].grad().expect("output bias gradient");
        assert_eq!(bias_grad.to_vec(), vec![0.0, 1.0]);
        assert!(fused.grad().is_some());
    }

    #[test]
    fn test_rejects_wrong_width() {
        let head = MultimodalHead::new(3, &mut ParamInit::seeded(5));
        let err = head
            .forward_batch(&[Tensor::zeros(2, false)], &Context::inference())
            .unwrap_err();
        assert!(matches!(err, BatchError::EmbeddingWidth { field: "fused", .. }));
    }
}
