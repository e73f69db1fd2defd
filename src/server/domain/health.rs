//! Results of probing the inference server health endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the most recent health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerHealthStatus {
    /// No probe has run for this session.
    Unknown,
    /// `GET /health` answered with HTTP 200.
    Healthy,
    /// The endpoint was unreachable, answered with another status, or the
    /// process exited.
    Unhealthy,
}

/// Health status stamped with the time it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHealthSnapshot {
    status: ServerHealthStatus,
    checked_at: DateTime<Utc>,
    message: Option<String>,
}

impl ServerHealthSnapshot {
    /// Snapshot for a session that has not been probed.
    #[must_use]
    pub const fn unknown(checked_at: DateTime<Utc>) -> Self {
        Self {
            status: ServerHealthStatus::Unknown,
            checked_at,
            message: None,
        }
    }

    /// Snapshot for a successful probe.
    #[must_use]
    pub const fn healthy(checked_at: DateTime<Utc>) -> Self {
        Self {
            status: ServerHealthStatus::Healthy,
            checked_at,
            message: None,
        }
    }

    /// Snapshot for a failed probe. A blank `reason` is not recorded.
    #[must_use]
    pub fn unhealthy(checked_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        let text: String = reason.into();
        let trimmed = text.trim();
        Self {
            status: ServerHealthStatus::Unhealthy,
            checked_at,
            message: (!trimmed.is_empty()).then(|| trimmed.to_owned()),
        }
    }

    /// Returns the probe outcome.
    #[must_use]
    pub const fn status(&self) -> ServerHealthStatus {
        self.status
    }

    /// Returns when the probe ran.
    #[must_use]
    pub const fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Returns why the server was unhealthy, if recorded.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
