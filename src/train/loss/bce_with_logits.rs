//! Binary Cross-Entropy with Logits Loss
//!
//! Combines a sigmoid activation with binary cross-entropy loss. Used by
//! threshold fusion, whose continuous vote average is treated as a logit.
//!
//! # Formula
//!
//! Numerically stable computation:
//! ```text
//! L_i = max(x_i, 0) - x_i * t_i + log(1 + exp(-|x_i|))
//! L = mean(L_i) over all i
//! ```
//!
//! Gradient: `∂L/∂x_i = (σ(x_i) - t_i) / N`

use crate::autograd::{sigmoid_scalar, BackwardOp};
use crate::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

use super::LossFn;

/// Binary Cross-Entropy with Logits Loss.
///
/// # Example
///
/// ```
/// use veraz::train::{BCEWithLogitsLoss, LossFn};
/// use veraz::Tensor;
///
/// let loss_fn = BCEWithLogitsLoss;
/// let logits = Tensor::from_vec(vec![2.0, -1.0, 0.5], true);
/// let targets = Tensor::from_vec(vec![1.0, 0.0, 1.0], false);
///
/// let loss = loss_fn.forward(&logits, &targets);
/// assert!(loss.item() > 0.0);
/// ```
pub struct BCEWithLogitsLoss;

impl BCEWithLogitsLoss {
    /// Numerically stable BCE: max(x, 0) - x*t + log(1 + exp(-|x|))
    fn stable_bce(logit: f32, target: f32) -> f32 {
        logit.max(0.0) - logit * target + (-logit.abs()).exp().ln_1p()
    }
}

impl LossFn for BCEWithLogitsLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let n = predictions.len().max(1) as f32;
        let total_loss: f32 = predictions
            .data()
            .iter()
            .zip(targets.data().iter())
            .map(|(&logit, &target)| Self::stable_bce(logit, target))
            .sum::<f32>()
            / n;

        let mut loss = Tensor::from_vec(vec![total_loss], predictions.requires_grad());

        if predictions.requires_grad() {
            let grad = (predictions.data().mapv(sigmoid_scalar) - targets.data()) / n;
            loss.set_backward_op(Rc::new(BCEBackward {
                predictions: predictions.clone(),
                grad,
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "BCEWithLogits"
    }
}

struct BCEBackward {
    predictions: Tensor,
    grad: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for BCEBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.grad * upstream[0]);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.predictions.clone()]
    }
}
