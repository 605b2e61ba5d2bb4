//! Affine layer autograd operation: y = W x + b

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{Array1, ArrayView2};
use std::cell::RefCell;
use std::rc::Rc;

/// Matrix-vector product plus bias.
///
/// `weight` is row-major `[out_features, in_features]`, `bias` has
/// `out_features` entries and `x` has `in_features` entries.
pub fn linear(
    x: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    in_features: usize,
    out_features: usize,
) -> Tensor {
    assert_eq!(x.len(), in_features, "linear: input size mismatch");
    assert_eq!(weight.len(), in_features * out_features, "linear: weight size mismatch");
    assert_eq!(bias.len(), out_features, "linear: bias size mismatch");

    let w = weight_view(weight, in_features, out_features);
    let data = w.dot(x.data()) + bias.data();

    let requires_grad = x.requires_grad() || weight.requires_grad() || bias.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(LinearBackward {
            x: x.clone(),
            weight: weight.clone(),
            bias: bias.clone(),
            in_features,
            out_features,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

fn weight_view(weight: &Tensor, in_features: usize, out_features: usize) -> ArrayView2<'_, f32> {
    weight
        .data()
        .view()
        .into_shape_with_order((out_features, in_features))
        .expect("weight length checked against in_features * out_features")
}

struct LinearBackward {
    x: Tensor,
    weight: Tensor,
    bias: Tensor,
    in_features: usize,
    out_features: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for LinearBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.bias.requires_grad() {
                self.bias.accumulate_grad(grad.clone());
            }
            if self.weight.requires_grad() {
                // ∂L/∂W[o, i] = g[o] * x[i]
                let x = self.x.data();
                let mut grad_w = Vec::with_capacity(self.in_features * self.out_features);
                for &g in grad {
                    grad_w.extend(x.iter().map(|&xi| g * xi));
                }
                self.weight.accumulate_grad(Array1::from(grad_w));
            }
            if self.x.requires_grad() {
                // ∂L/∂x = Wᵀ g
                let w = weight_view(&self.weight, self.in_features, self.out_features);
                self.x.accumulate_grad(w.t().dot(grad));
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.weight.clone(), self.bias.clone()]
    }
}
