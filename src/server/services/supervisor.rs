//! Lifecycle supervisor for the inference server process.

use crate::inference::{adapters::HttpInferenceClient, domain::InferenceError};
use crate::server::{
    domain::{
        ConfigurationError, EntryPoint, InferenceServerConfig, ServerAddress, ServerDomainError,
        ServerHandle, ServerHealthSnapshot, ServerSessionId, ServerState,
    },
    ports::{HealthProbe, ManagedProcess, ProcessError, ProcessLauncher},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

/// Errors returned by [`InferenceServerSupervisor`].
#[derive(Debug, Clone, Error)]
pub enum SupervisorError {
    /// The configuration is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The state machine rejected a transition.
    #[error(transparent)]
    Domain(#[from] ServerDomainError),

    /// Neither entry point produced a running process.
    #[error("failed to launch inference server (primary: {primary}; legacy: {legacy})")]
    LaunchFailed {
        /// Failure of the OpenAI-compatible entry point.
        primary: String,
        /// Failure of the legacy entry point.
        legacy: String,
    },

    /// The health endpoint did not answer in time.
    #[error("inference server at {address} did not become healthy within {timeout:?}")]
    StartupTimeout {
        /// Address that was probed.
        address: ServerAddress,
        /// Configured start-up deadline.
        timeout: Duration,
    },

    /// Signalling or reaping the process failed.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The inference client could not be built.
    #[error(transparent)]
    Client(#[from] InferenceError),

    /// The operation needs a healthy server.
    #[error("inference server is not running (current state: {0})")]
    NotRunning(ServerState),
}

/// Result type for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;

enum HealthOutcome {
    Healthy,
    Exited(String),
    TimedOut(String),
}

/// Why an entry point produced no healthy server.
enum EntryPointFailure {
    /// It could not be spawned or exited early.
    Unusable(String),
    /// It ran but the health endpoint stayed silent; holds the last probe
    /// error.
    TimedOut(String),
}

impl EntryPointFailure {
    fn into_reason(self) -> String {
        match self {
            Self::Unusable(reason) => reason,
            Self::TimedOut(last_error) => format!("health endpoint never answered ({last_error})"),
        }
    }
}

/// Owns the inference server process and drives its lifecycle.
///
/// At most one child process exists per supervisor. `start` and `stop`
/// take `&mut self`, so overlapping lifecycle calls cannot compile.
pub struct InferenceServerSupervisor<L, P, C>
where
    L: ProcessLauncher,
    P: HealthProbe,
    C: Clock + Send + Sync,
{
    config: InferenceServerConfig,
    launcher: Arc<L>,
    probe: Arc<P>,
    clock: Arc<C>,
    state: ServerState,
    handle: Option<ServerHandle>,
    process: Option<L::Process>,
}

impl<L, P, C> InferenceServerSupervisor<L, P, C>
where
    L: ProcessLauncher,
    P: HealthProbe,
    C: Clock + Send + Sync,
{
    /// Creates a stopped supervisor.
    #[must_use]
    pub const fn new(
        config: InferenceServerConfig,
        launcher: Arc<L>,
        probe: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            config,
            launcher,
            probe,
            clock,
            state: ServerState::Stopped,
            handle: None,
            process: None,
        }
    }

    /// Creates a stopped supervisor configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Configuration`] when the environment does
    /// not describe a valid configuration.
    pub fn from_env(launcher: Arc<L>, probe: Arc<P>, clock: Arc<C>) -> SupervisorResult<Self> {
        let config = InferenceServerConfig::from_env()?;
        Ok(Self::new(config, launcher, probe, clock))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &InferenceServerConfig {
        &self.config
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the current session record, if a session exists.
    #[must_use]
    pub const fn handle(&self) -> Option<&ServerHandle> {
        self.handle.as_ref()
    }

    /// Returns the server base URL while the server is healthy.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        (self.state == ServerState::Healthy).then(|| self.config.address().base_url())
    }

    /// Starts the server and waits for it to become healthy.
    ///
    /// An existing session is stopped first. When the OpenAI-compatible
    /// entry point cannot be spawned, exits, or stays unhealthy past the
    /// start-up deadline, the legacy entry point is tried.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::StartupTimeout`] when the legacy entry
    /// point runs but its health endpoint stays silent,
    /// [`SupervisorError::LaunchFailed`] when it does not run at all, and
    /// process or state errors otherwise. The supervisor is left `failed`
    /// in every case.
    pub async fn start(&mut self) -> SupervisorResult<HttpInferenceClient> {
        if self.handle.is_some() || self.process.is_some() || self.state != ServerState::Stopped {
            info!(state = %self.state, "restarting inference server");
            self.stop().await?;
        }

        let client = HttpInferenceClient::new(self.config.address().base_url())?;
        self.transition(ServerState::Starting)?;
        let session_id = ServerSessionId::new();

        let primary_attempt = self
            .start_entry_point(session_id, EntryPoint::OpenAiCompatible)
            .await?;
        let process = match primary_attempt {
            Ok(process) => process,
            Err(primary) => {
                let primary_reason = primary.into_reason();
                warn!(
                    %session_id,
                    reason = %primary_reason,
                    "primary entry point failed; trying legacy"
                );
                self.handle = None;
                let legacy_attempt = self.start_entry_point(session_id, EntryPoint::Legacy).await?;
                match legacy_attempt {
                    Ok(process) => process,
                    Err(legacy) => return Err(self.fail_start(session_id, primary_reason, legacy)),
                }
            }
        };

        self.process = Some(process);
        self.record_health(ServerHealthSnapshot::healthy(self.clock.utc()));
        self.transition(ServerState::Healthy)?;
        info!(
            %session_id,
            base_url = client.base_url(),
            "inference server is healthy"
        );
        Ok(client)
    }

    /// Moves to `failed` once neither entry point produced a healthy server.
    ///
    /// A legacy timeout keeps its session record so the last probe error
    /// stays visible.
    fn fail_start(
        &mut self,
        session_id: ServerSessionId,
        primary: String,
        legacy: EntryPointFailure,
    ) -> SupervisorError {
        let outcome = match legacy {
            EntryPointFailure::TimedOut(_) => {
                let address = self.config.address().clone();
                let timeout = self.config.startup_timeout();
                error!(
                    %session_id,
                    %primary,
                    %address,
                    ?timeout,
                    "inference server start-up timed out"
                );
                SupervisorError::StartupTimeout { address, timeout }
            }
            EntryPointFailure::Unusable(legacy_reason) => {
                self.handle = None;
                error!(
                    %session_id,
                    %primary,
                    legacy = %legacy_reason,
                    "inference server failed to launch"
                );
                SupervisorError::LaunchFailed {
                    primary,
                    legacy: legacy_reason,
                }
            }
        };
        if let Err(err) = self.transition(ServerState::Failed) {
            return err;
        }
        outcome
    }

    /// Launches one entry point and waits for health.
    ///
    /// The inner error says why the entry point is unusable, leaving the
    /// caller free to try another. The outer error ends start-up.
    async fn start_entry_point(
        &mut self,
        session_id: ServerSessionId,
        entry_point: EntryPoint,
    ) -> SupervisorResult<Result<L::Process, EntryPointFailure>> {
        let command = self.config.launch_command(entry_point);
        info!(%session_id, %entry_point, %command, "launching inference server");
        let mut process = match self.launcher.launch(&command).await {
            Ok(process) => process,
            Err(err) => return Ok(Err(EntryPointFailure::Unusable(err.to_string()))),
        };

        self.handle = Some(ServerHandle::new(
            session_id,
            process.id(),
            self.config.address().clone(),
            entry_point,
            &*self.clock,
        ));

        let outcome = match await_health(&self.config, &*self.probe, &mut process).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    %session_id,
                    %entry_point,
                    error = %err,
                    "lost track of inference server process"
                );
                discard(session_id, process, self.config.shutdown_grace()).await;
                self.record_health(ServerHealthSnapshot::unhealthy(
                    self.clock.utc(),
                    err.to_string(),
                ));
                self.transition(ServerState::Failed)?;
                return Err(err);
            }
        };
        match outcome {
            HealthOutcome::Healthy => Ok(Ok(process)),
            HealthOutcome::Exited(status) => {
                self.handle = None;
                Ok(Err(EntryPointFailure::Unusable(format!(
                    "process exited before becoming healthy ({status})"
                ))))
            }
            HealthOutcome::TimedOut(last_error) => {
                warn!(
                    %session_id,
                    %entry_point,
                    error = %last_error,
                    "inference server did not become healthy in time"
                );
                discard(session_id, process, self.config.shutdown_grace()).await;
                self.record_health(ServerHealthSnapshot::unhealthy(
                    self.clock.utc(),
                    last_error.as_str(),
                ));
                Ok(Err(EntryPointFailure::TimedOut(last_error)))
            }
        }
    }

    /// Stops the server, waiting up to the shutdown grace before killing it.
    ///
    /// Stopping a stopped supervisor does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Process`] when the process cannot be
    /// signalled or reaped. The supervisor is stopped either way.
    pub async fn stop(&mut self) -> SupervisorResult<()> {
        if self.state == ServerState::Stopped && self.process.is_none() {
            return Ok(());
        }

        let mut outcome = Ok(());
        if let Some(mut process) = self.process.take() {
            info!(pid = process.id(), "stopping inference server");
            outcome = process.terminate(self.config.shutdown_grace()).await;
        }
        self.handle = None;
        if self.state != ServerState::Stopped {
            self.transition(ServerState::Stopped)?;
        }
        outcome.map_err(SupervisorError::from)
    }

    /// Re-probes a healthy server and records the snapshot.
    ///
    /// A process that has exited moves the supervisor to `failed`.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::NotRunning`] unless the server is healthy.
    pub async fn refresh_health(&mut self) -> SupervisorResult<ServerHealthSnapshot> {
        if self.state != ServerState::Healthy {
            return Err(SupervisorError::NotRunning(self.state));
        }

        let exited = self
            .process
            .as_mut()
            .map_or_else(|| Ok(Some("no process".to_owned())), ManagedProcess::exit_status)?;
        if let Some(status) = exited {
            warn!(%status, "inference server process has exited");
            self.process = None;
            self.transition(ServerState::Failed)?;
            let snapshot = ServerHealthSnapshot::unhealthy(
                self.clock.utc(),
                format!("process exited ({status})"),
            );
            self.record_health(snapshot.clone());
            return Ok(snapshot);
        }

        let snapshot = match self.probe.check(&self.config.address().health_url()).await {
            Ok(()) => ServerHealthSnapshot::healthy(self.clock.utc()),
            Err(err) => ServerHealthSnapshot::unhealthy(self.clock.utc(), err.to_string()),
        };

        self.record_health(snapshot.clone());
        Ok(snapshot)
    }

    fn record_health(&mut self, snapshot: ServerHealthSnapshot) {
        if let Some(handle) = self.handle.as_mut() {
            handle.record_health(snapshot);
        }
    }

    fn transition(&mut self, target: ServerState) -> SupervisorResult<()> {
        if !self.state.can_transition_to(target) {
            return Err(ServerDomainError::InvalidStateTransition {
                from: self.state.as_str().to_owned(),
                to: target.as_str().to_owned(),
            }
            .into());
        }
        debug!(from = %self.state, to = %target, "inference server state change");
        self.state = target;
        if let Some(handle) = self.handle.as_mut() {
            handle.set_state(target);
        }
        Ok(())
    }
}

/// Terminates a process that will not be kept.
async fn discard<M>(session_id: ServerSessionId, mut process: M, grace: Duration)
where
    M: ManagedProcess,
{
    if let Err(err) = process.terminate(grace).await {
        warn!(%session_id, error = %err, "failed to terminate discarded server process");
    }
}

/// Polls the health endpoint until it answers or the start-up deadline
/// passes. An early process exit ends the wait.
///
/// A timeout too large to represent as an instant never expires.
async fn await_health<M, P>(
    config: &InferenceServerConfig,
    probe: &P,
    process: &mut M,
) -> SupervisorResult<HealthOutcome>
where
    M: ManagedProcess,
    P: HealthProbe,
{
    let url = config.address().health_url();
    let deadline = Instant::now().checked_add(config.startup_timeout());

    loop {
        if let Some(status) = process.exit_status()? {
            return Ok(HealthOutcome::Exited(status));
        }
        let failure = match probe.check(&url).await {
            Ok(()) => return Ok(HealthOutcome::Healthy),
            Err(err) => err,
        };
        debug!(%url, error = %failure, "inference server not healthy yet");
        if deadline.is_some_and(|limit| Instant::now() >= limit) {
            return Ok(HealthOutcome::TimedOut(failure.to_string()));
        }
        sleep(config.probe_interval()).await;
    }
}
