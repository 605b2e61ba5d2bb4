//! Backward operation trait and graph traversal

use super::Tensor;
use ndarray::Array1;
use std::collections::HashSet;
use std::rc::Rc;

/// A recorded operation that can push its output gradient into its inputs.
///
/// Implementations only accumulate into their direct inputs; traversal order
/// is owned by [`backward`], which guarantees every consumer of a node has run
/// before the node itself propagates.
pub trait BackwardOp {
    /// Propagate the output gradient into the inputs' gradient cells
    fn backward(&self);

    /// Inputs this operation propagates into
    fn inputs(&self) -> Vec<Tensor>;
}

/// Perform the backward pass from `tensor`.
///
/// The seed gradient defaults to ones (the usual case for a scalar loss).
pub fn backward(tensor: &mut Tensor, grad_output: Option<Array1<f32>>) {
    let seed = grad_output.unwrap_or_else(|| Array1::ones(tensor.len()));
    tensor.set_grad(seed);

    for op in reverse_topological(tensor) {
        op.backward();
    }
}

/// Backward ops reachable from `root`, outputs before the nodes that feed them
fn reverse_topological(root: &Tensor) -> Vec<Rc<dyn BackwardOp>> {
    let mut order: Vec<Rc<dyn BackwardOp>> = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        let Some(op) = node.backward_op() else {
            continue;
        };
        if expanded {
            order.push(op);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        stack.push((node, true));
        for input in op.inputs() {
            if !visited.contains(&input.node_id()) {
                stack.push((input, false));
            }
        }
    }

    order.reverse();
    order
}
