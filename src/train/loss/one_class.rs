//! One-class angular margin loss
//!
//! Operates on cosine similarities between embeddings and a learned genuine
//! centre. Genuine samples (label 0) are pulled above `r_real`, fake samples
//! (label 1) are pushed below `r_fake`:
//!
//! ```text
//! z_i = alpha * (r_real - cos_i)   if t_i = 0
//! z_i = alpha * (cos_i - r_fake)   if t_i = 1
//! L   = mean(softplus(z_i))
//! ```
//!
//! Gradient: `∂L/∂cos_i = σ(z_i) * (∓alpha) / N`

use crate::autograd::{sigmoid_scalar, softplus_scalar, BackwardOp};
use crate::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

use super::LossFn;

/// Margin-based one-class loss over cosine similarities.
///
/// Targets are `0.0` (genuine) or `1.0` (fake); every sample contributes its own
/// term, so a batch holding a single class is as well defined as a mixed one.
///
/// # Example
///
/// ```
/// use veraz::train::{LossFn, OneClassMarginLoss};
/// use veraz::Tensor;
///
/// let loss_fn = OneClassMarginLoss::new(20.0, 0.9, 0.5);
/// let cosines = Tensor::from_vec(vec![0.99, -0.2], true);
/// let labels = Tensor::from_vec(vec![0.0, 1.0], false);
///
/// let loss = loss_fn.forward(&cosines, &labels);
/// assert!(loss.item() < 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneClassMarginLoss {
    alpha: f32,
    r_real: f32,
    r_fake: f32,
}

impl OneClassMarginLoss {
    pub fn new(alpha: f32, r_real: f32, r_fake: f32) -> Self {
        Self { alpha, r_real, r_fake }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Pre-activation margin `z` and `∂z/∂cos` for one sample
    fn margin(&self, cos: f32, target: f32) -> (f32, f32) {
        if target >= 0.5 {
            (self.alpha * (cos - self.r_fake), self.alpha)
        } else {
            (self.alpha * (self.r_real - cos), -self.alpha)
        }
    }
}

impl LossFn for OneClassMarginLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let n = predictions.len().max(1) as f32;
        let margins: Vec<(f32, f32)> = predictions
            .data()
            .iter()
            .zip(targets.data().iter())
            .map(|(&cos, &t)| self.margin(cos, t))
            .collect();

        let total_loss = margins.iter().map(|&(z, _)| softplus_scalar(z)).sum::<f32>() / n;
        let mut loss = Tensor::from_vec(vec![total_loss], predictions.requires_grad());

        if predictions.requires_grad() {
            let grad: Array1<f32> = margins
                .iter()
                .map(|&(z, dz)| sigmoid_scalar(z) * dz / n)
                .collect();
            loss.set_backward_op(Rc::new(OneClassBackward {
                predictions: predictions.clone(),
                grad,
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "OneClassMargin"
    }
}

struct OneClassBackward {
    predictions: Tensor,
    grad: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for OneClassBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.grad * upstream[0]);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.predictions.clone()]
    }
}
