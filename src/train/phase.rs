//! Step phase

use crate::autograd::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which loop a step or epoch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Train,
    Validate,
    Test,
}

impl Phase {
    /// Training records a graph; the other phases run detached
    pub fn context(self) -> Context {
        match self {
            Phase::Train => Context::new(),
            Phase::Validate | Phase::Test => Context::inference(),
        }
    }

    /// Whether per-step values are logged as soon as the step completes
    pub fn logs_online(self) -> bool {
        !matches!(self, Phase::Test)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Validate => "validate",
            Phase::Test => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "train" => Ok(Phase::Train),
            "validate" | "val" => Ok(Phase::Validate),
            "test" => Ok(Phase::Test),
            _ => Err(format!("Unknown phase: {s}. Valid phases: train, validate, test")),
        }
    }
}
