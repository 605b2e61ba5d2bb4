//! Loss functions for training
//!
//! - [`OneClassMarginLoss`] - Angular margin loss for the unimodal one-class scorers
//! - [`CrossEntropyLoss`] - Learned fusion and the synchrony auxiliary term
//! - [`BCEWithLogitsLoss`] - Threshold fusion's continuous vote average

mod bce_with_logits;
mod cross_entropy;
mod one_class;
mod traits;

pub use bce_with_logits::BCEWithLogitsLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use one_class::OneClassMarginLoss;
pub use traits::LossFn;
