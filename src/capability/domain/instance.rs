//! Initialisation state of a capability instance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Setup state of a constructed capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// The capability was constructed but `setup` has not run.
    Unconfigured,
    /// `setup` completed and the capability accepts `apply` calls.
    Ready,
}

impl InstanceState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
