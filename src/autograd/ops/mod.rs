//! Autograd operations with backward passes
//!
//! This module provides differentiable operations for automatic differentiation.

mod activations;
mod basic;
mod linear;
mod normalize;
mod shape;

// Re-export all public operations
pub use activations::{log_sum_exp, relu, sigmoid_scalar, softmax_values, softplus_scalar};
pub use basic::{add, mean, scale, sum};
pub use linear::linear;
pub use normalize::{cosine_similarity, NORM_EPSILON};
pub use shape::{concat, select};
