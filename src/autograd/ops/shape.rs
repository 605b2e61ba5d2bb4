//! Shape autograd operations: concat, select

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{s, Array1};
use std::cell::RefCell;
use std::rc::Rc;

/// Concatenate tensors end to end
pub fn concat(parts: &[Tensor]) -> Tensor {
    let data: Vec<f32> = parts.iter().flat_map(|t| t.data().iter().copied()).collect();
    let requires_grad = parts.iter().any(Tensor::requires_grad);

    let mut result = Tensor::from_vec(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ConcatBackward {
            parts: parts.to_vec(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ConcatBackward {
    parts: Vec<Tensor>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let mut offset = 0;
            for part in &self.parts {
                let end = offset + part.len();
                if part.requires_grad() {
                    part.accumulate_grad(grad.slice(s![offset..end]).to_owned());
                }
                offset = end;
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        self.parts.clone()
    }
}

/// Single element `a[index]` as a one-element tensor
pub fn select(a: &Tensor, index: usize) -> Tensor {
    assert!(index < a.len(), "select: index {index} out of bounds for length {}", a.len());
    let requires_grad = a.requires_grad();

    let mut result = Tensor::scalar(a.data()[index], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SelectBackward {
            a: a.clone(),
            index,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SelectBackward {
    a: Tensor,
    index: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SelectBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                let mut grad_a = Array1::zeros(self.a.len());
                grad_a[self.index] = grad[0];
                self.a.accumulate_grad(grad_a);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}
