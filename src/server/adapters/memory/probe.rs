//! Scripted health probe.

use crate::server::ports::{HealthProbe, HealthProbeError};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct ProbeState {
    failures_before_healthy: Option<usize>,
    calls: usize,
    urls: Vec<String>,
}

/// Health probe that fails a fixed number of times before succeeding.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHealthProbe {
    state: Arc<RwLock<ProbeState>>,
}

impl ScriptedHealthProbe {
    /// Creates a probe that reports healthy after `failures` failed checks.
    #[must_use]
    pub fn healthy_after(failures: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(ProbeState {
                failures_before_healthy: Some(failures),
                ..ProbeState::default()
            })),
        }
    }

    /// Creates a probe that is healthy on the first check.
    #[must_use]
    pub fn always_healthy() -> Self {
        Self::healthy_after(0)
    }

    /// Creates a probe that never reports healthy.
    #[must_use]
    pub fn never_healthy() -> Self {
        Self::default()
    }

    /// Switches between healthy and unreachable for later checks.
    pub fn set_healthy(&self, healthy: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.failures_before_healthy = healthy.then_some(state.calls);
    }

    /// Returns how many checks have run.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
    }

    /// Returns every probed URL, oldest first.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .urls
            .clone()
    }
}

#[async_trait]
impl HealthProbe for ScriptedHealthProbe {
    async fn check(&self, url: &str) -> Result<(), HealthProbeError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let previous_calls = state.calls;
        state.calls = state.calls.saturating_add(1);
        state.urls.push(url.to_owned());
        match state.failures_before_healthy {
            Some(failures) if previous_calls >= failures => Ok(()),
            _ => Err(HealthProbeError::Unreachable("connection refused".to_owned())),
        }
    }
}
