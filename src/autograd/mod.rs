//! Tape-based autograd engine
//!
//! Provides reverse-mode automatic differentiation over one-dimensional `f32`
//! tensors. Every differentiable operation records a [`BackwardOp`] on its
//! output; [`backward`] replays them from the loss towards the leaves in
//! reverse topological order, so nodes shared by several consumers (the
//! multimodal logits feed both fusion and the synchrony loss) receive the sum
//! of their consumers' gradients before propagating further.

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{backward, BackwardOp};
pub use context::Context;
pub use ops::*;
pub use tensor::Tensor;
