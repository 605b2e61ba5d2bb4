//! Execution context controlling whether graphs are recorded

use super::Tensor;

/// Context for managing the computational graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    training: bool,
}

impl Context {
    /// Create a new context (training mode)
    pub fn new() -> Self {
        Self { training: true }
    }

    /// Context with gradients disabled
    pub fn inference() -> Self {
        Self { training: false }
    }

    /// Check if in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// View of `tensor` appropriate for this context.
    ///
    /// In evaluation mode the view is detached, so nothing computed from it
    /// records a graph or reaches the source tensor's gradient.
    pub fn view(&self, tensor: &Tensor) -> Tensor {
        if self.training {
            tensor.clone()
        } else {
            tensor.detach()
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
