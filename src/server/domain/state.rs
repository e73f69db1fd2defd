//! Lifecycle state machine of a supervised server.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the supervised inference server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerState {
    /// No process is running.
    Stopped,
    /// A process was launched and is being probed.
    Starting,
    /// The health endpoint answered and the server accepts requests.
    Healthy,
    /// Start-up failed or the process died; no usable process remains.
    Failed,
}

impl ServerState {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Healthy => "healthy",
            Self::Failed => "failed",
        }
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Stopped, Self::Starting)
                | (Self::Starting, Self::Healthy | Self::Failed | Self::Stopped)
                | (Self::Healthy, Self::Stopped | Self::Starting | Self::Failed)
                | (Self::Failed, Self::Starting | Self::Stopped)
        )
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
