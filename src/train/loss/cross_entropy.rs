//! Cross Entropy Loss for classification

use crate::autograd::{concat, log_sum_exp, mean, softmax_values, BackwardOp};
use crate::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

use super::LossFn;

/// Cross Entropy Loss over raw logits (for classification)
///
/// L = Σ_i t_i · (logsumexp(x) - x_i)
///
/// Computed from logits via log-sum-exp, so large logits never overflow and a
/// confidently wrong prediction yields a large finite loss instead of `inf`.
///
/// # Example
///
/// ```
/// use veraz::train::{CrossEntropyLoss, LossFn};
/// use veraz::Tensor;
///
/// let loss_fn = CrossEntropyLoss;
/// let logits = Tensor::from_vec(vec![2.0, 1.0], true);
/// let targets = Tensor::from_vec(vec![1.0, 0.0], false); // one-hot
///
/// let loss = loss_fn.forward(&logits, &targets);
/// assert!(loss.item() > 0.0);
/// ```
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// One-hot encoding of `class` over `n_classes`
    pub fn one_hot(class: usize, n_classes: usize) -> Tensor {
        let mut data = vec![0.0; n_classes];
        if let Some(slot) = data.get_mut(class) {
            *slot = 1.0;
        }
        Tensor::from_vec(data, false)
    }

    /// Mean cross-entropy over a batch of logit rows and class indices
    ///
    /// Each row is an independent sample; a batch in which every label is the
    /// same class is well defined.
    pub fn batch_mean(&self, logits: &[Tensor], classes: &[u8]) -> Tensor {
        assert_eq!(
            logits.len(),
            classes.len(),
            "Logit rows and class labels must have same length"
        );
        let per_sample: Vec<Tensor> = logits
            .iter()
            .zip(classes)
            .map(|(row, &class)| self.forward(row, &Self::one_hot(usize::from(class), row.len())))
            .collect();
        mean(&concat(&per_sample))
    }
}

impl LossFn for CrossEntropyLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let lse = log_sum_exp(predictions.data());
        let ce: f32 = targets
            .data()
            .iter()
            .zip(predictions.data().iter())
            .map(|(&t, &x)| t * (lse - x))
            .sum();

        let mut loss = Tensor::from_vec(vec![ce], predictions.requires_grad());

        if predictions.requires_grad() {
            // ∂CE/∂x = Σt · softmax(x) - t
            let target_mass = targets.data().sum();
            let grad = softmax_values(predictions.data()) * target_mass - targets.data();
            loss.set_backward_op(Rc::new(CEBackward {
                predictions: predictions.clone(),
                grad,
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}

struct CEBackward {
    predictions: Tensor,
    grad: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for CEBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.grad * upstream[0]);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.predictions.clone()]
    }
}
