//! Normalization autograd operations: cosine similarity of L2-normalised vectors

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Lower bound on a vector norm before division
pub const NORM_EPSILON: f32 = 1e-12;

/// L2 norm clamped below by [`NORM_EPSILON`]
fn clamped_norm(x: &Array1<f32>) -> (f32, bool) {
    let norm = x.dot(x).sqrt();
    if norm > NORM_EPSILON {
        (norm, true)
    } else {
        (NORM_EPSILON, false)
    }
}

/// Cosine similarity of two vectors as a one-element tensor
///
/// cos(a, b) = (a / max(‖a‖, ε)) · (b / max(‖b‖, ε))
///
/// A zero vector yields 0 rather than NaN.
pub fn cosine_similarity(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "cosine_similarity: operands must have same length");

    let (norm_a, a_active) = clamped_norm(a.data());
    let (norm_b, b_active) = clamped_norm(b.data());
    let a_hat = a.data() / norm_a;
    let b_hat = b.data() / norm_b;
    let cos = a_hat.dot(&b_hat);

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(Array1::from(vec![cos]), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(CosineBackward {
            a: a.clone(),
            b: b.clone(),
            a_hat,
            b_hat,
            norm_a: (norm_a, a_active),
            norm_b: (norm_b, b_active),
            cos,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct CosineBackward {
    a: Tensor,
    b: Tensor,
    a_hat: Array1<f32>,
    b_hat: Array1<f32>,
    norm_a: (f32, bool),
    norm_b: (f32, bool),
    cos: f32,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl CosineBackward {
    /// ∂cos/∂x for the operand with unit vector `x_hat`, partner `other_hat`
    fn partial(
        x_hat: &Array1<f32>,
        other_hat: &Array1<f32>,
        (norm, active): (f32, bool),
        cos: f32,
    ) -> Array1<f32> {
        if active {
            (other_hat - &(x_hat * cos)) / norm
        } else {
            // clamped norm is constant, only the numerator varies
            other_hat / norm
        }
    }
}

impl BackwardOp for CosineBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let g = grad[0];
            if self.a.requires_grad() {
                let d = Self::partial(&self.a_hat, &self.b_hat, self.norm_a, self.cos);
                self.a.accumulate_grad(d * g);
            }
            if self.b.requires_grad() {
                let d = Self::partial(&self.b_hat, &self.a_hat, self.norm_b, self.cos);
                self.b.accumulate_grad(d * g);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}
