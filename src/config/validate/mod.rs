//! Configuration validation
//!
//! Rejects detector configurations that cannot be built before any
//! parameter is allocated.

mod error;
mod validator;


pub use error::ValidationError;
pub use validator::validate_config;
