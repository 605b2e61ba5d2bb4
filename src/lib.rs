//! # veraz
//!
//! Audio-visual authenticity scoring for deepfake detection.
//!
//! Given per-sample audio, visual, and fused embeddings from an external
//! encoder, veraz scores each modality against a learned genuine centre,
//! fuses the scores with a multimodal logit, and aggregates an epoch of
//! predictions into accuracy, AUROC, F1, and equal error rate.
//!
//! ## Modules
//!
//! - [`autograd`]: tape-based reverse-mode differentiation over 1-D tensors
//! - [`model`]: one-class scorers, the multimodal head, parameter init
//! - [`fusion`]: learned and threshold fusion, synchrony loss
//! - [`train`]: batches, the phase-parameterised step, loss functions
//! - [`eval`]: binary metrics, EER, epoch aggregation, cross-worker gather
//! - [`config`]: YAML configuration, validation, CLI arguments
//!
//! ## Example
//!
//! ```no_run
//! use veraz::config::load_config;
//! use veraz::eval::{EpochAggregator, LocalGather};
//! use veraz::train::{AvBatch, Detector, Encoder, Phase};
//!
//! fn run_epoch<E: Encoder>(encoder: &E, batches: &[AvBatch]) -> veraz::Result<()> {
//!     let detector = Detector::new(load_config("detector.yaml")?)?;
//!     let mut aggregator = EpochAggregator::new();
//!     for batch in batches {
//!         let step = detector.step(Phase::Validate, batch, encoder)?;
//!         aggregator.push(&step)?;
//!     }
//!     let metrics = aggregator.finish(Phase::Validate, &LocalGather)?;
//!     println!("{metrics}");
//!     Ok(())
//! }
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod error;
pub mod eval;
pub mod fusion;
pub mod model;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
