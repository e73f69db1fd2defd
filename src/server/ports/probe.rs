//! Health probe port.

use async_trait::async_trait;
use thiserror::Error;

/// Reasons a health probe did not report a healthy server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthProbeError {
    /// Nothing answered at the health URL.
    #[error("health endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered with a status other than 200.
    #[error("health endpoint returned HTTP {0}")]
    Status(u16),
}

/// Checks whether the server's health endpoint answers.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns `Ok(())` when `url` answers with HTTP 200.
    ///
    /// # Errors
    ///
    /// Returns [`HealthProbeError`] describing why the server is not healthy.
    async fn check(&self, url: &str) -> Result<(), HealthProbeError>;
}
