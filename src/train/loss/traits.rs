//! Loss function trait

use crate::Tensor;

/// Trait for loss functions
pub trait LossFn {
    /// Compute the loss of `predictions` against `targets`.
    ///
    /// Returns a one-element tensor; when `predictions` requires gradients the
    /// result carries the backward op that feeds them.
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &str;
}
