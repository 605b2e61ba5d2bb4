//! Detector steps and the losses they assemble
//!
//! This module provides:
//! - Loss functions (one-class margin, cross-entropy, BCE with logits)
//! - The batch input contract and the [`Encoder`] boundary
//! - [`Detector`], one step function parameterised by [`Phase`]
//! - [`StepResult`] and its transportable [`StepRecord`]
//!
//! # Example
//!
//! ```no_run
//! use veraz::config::load_config;
//! use veraz::train::{Detector, Phase};
//! # use veraz::train::{AvBatch, Encoder};
//! # fn encoder() -> Box<dyn Encoder> { todo!() }
//! # fn batches() -> Vec<AvBatch> { todo!() }
//!
//! let detector = Detector::new(load_config("detector.yaml")?)?;
//! let encoder = encoder();
//!
//! for batch in batches() {
//!     let mut result = detector.step(Phase::Train, &batch, encoder.as_ref())?;
//!     veraz::autograd::backward(result.loss_mut(), None);
//!     // hand detector.parameters_mut() to the optimizer
//!     detector.zero_grad();
//! }
//! # Ok::<(), veraz::Error>(())
//! ```

mod batch;
mod detector;
mod encoder;
mod loss;
mod phase;
mod step;

#[cfg(test)]
mod tests;

pub use batch::{check_rows, AvBatch, BatchError, BatchLabels};
pub use detector::Detector;
pub use encoder::{Encoder, EncoderOutput};
pub use loss::{BCEWithLogitsLoss, CrossEntropyLoss, LossFn, OneClassMarginLoss};
pub use phase::Phase;
pub use step::{LossComponents, StepRecord, StepResult};

pub(crate) use step::as_f32;
