//! Shared fixtures for in-memory integration tests.

use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;
use vision_agent::server::{
    adapters::memory::{InMemoryProcessLauncher, ScriptedHealthProbe},
    domain::{ConfigurationError, EntryPoint, InferenceServerConfig},
    services::InferenceServerSupervisor,
};

/// Supervisor wired to in-memory adapters.
pub type TestSupervisor =
    InferenceServerSupervisor<InMemoryProcessLauncher, ScriptedHealthProbe, DefaultClock>;

/// Builds a configuration with timings short enough for tests.
///
/// # Errors
///
/// Returns an error if any of the fixed values fail validation.
pub fn fast_config() -> Result<InferenceServerConfig, ConfigurationError> {
    Ok(InferenceServerConfig::new("/models/llava-7b")?
        .with_startup_timeout(Duration::from_millis(60))?
        .with_probe_interval(Duration::from_millis(5))?
        .with_shutdown_grace(Duration::from_millis(10)))
}

/// Launcher, probe and a stopped supervisor sharing them.
pub struct SupervisorContext {
    pub launcher: Arc<InMemoryProcessLauncher>,
    pub probe: Arc<ScriptedHealthProbe>,
    pub supervisor: TestSupervisor,
}

impl SupervisorContext {
    /// Creates a context around `probe` using [`fast_config`].
    pub fn with_probe(probe: ScriptedHealthProbe) -> Self {
        Self::with_config(fast_config().expect("valid test configuration"), probe)
    }

    /// Creates a context around `config` and `probe`.
    pub fn with_config(config: InferenceServerConfig, probe: ScriptedHealthProbe) -> Self {
        let launcher = Arc::new(InMemoryProcessLauncher::new());
        let shared_probe = Arc::new(probe);
        let supervisor = InferenceServerSupervisor::new(
            config,
            Arc::clone(&launcher),
            Arc::clone(&shared_probe),
            Arc::new(DefaultClock),
        );
        Self {
            launcher,
            probe: shared_probe,
            supervisor,
        }
    }

    /// Returns the number of simulated processes still alive.
    pub fn live(&self) -> usize {
        self.launcher.live_count().expect("launcher state readable")
    }

    /// Returns the entry point of every launch so far, oldest first.
    pub fn entry_points(&self) -> Vec<EntryPoint> {
        self.launcher
            .launched()
            .expect("launch log")
            .iter()
            .map(|command| command.entry_point())
            .collect()
    }
}

/// Provides a context whose server turns healthy after two failed probes.
#[fixture]
pub fn context() -> SupervisorContext {
    SupervisorContext::with_probe(ScriptedHealthProbe::healthy_after(2))
}
