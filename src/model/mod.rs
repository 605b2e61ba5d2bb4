//! Learned components: one-class scorers, the multimodal head, and their
//! shared parameter plumbing

mod head;
mod init;
mod linear;
mod scorer;

pub use head::{MultimodalHead, NUM_CLASSES};
pub use init::{kaiming_bound, ParamInit};
pub use linear::Linear;
pub use scorer::{Modality, OneClassScorer, ScorerOutput};
