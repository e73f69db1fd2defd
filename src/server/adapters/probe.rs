//! HTTP health probe.

use crate::server::ports::{HealthProbe, HealthProbeError};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes the health endpoint with a plain `GET`.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpHealthProbe {
    /// Creates a probe with a five second per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HealthProbeError::Unreachable`] when the HTTP stack cannot be
    /// initialised.
    pub fn new() -> Result<Self, HealthProbeError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| HealthProbeError::Unreachable(err.to_string()))?;
        Ok(Self {
            http,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Bounds each probe request by `timeout`.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self, url: &str) -> Result<(), HealthProbeError> {
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| HealthProbeError::Unreachable(err.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::OK {
            Ok(())
        } else {
            Err(HealthProbeError::Status(status.as_u16()))
        }
    }
}
