//! Agent bundled with the inference server it depends on.

use super::{ToolSelector, VisionAgent};
use crate::agent::domain::AgentResult;
use crate::capability::services::CapabilityRegistry;
use crate::inference::adapters::HttpInferenceClient;
use crate::server::{
    domain::InferenceServerConfig,
    ports::{HealthProbe, ProcessLauncher},
    services::InferenceServerSupervisor,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// A [`VisionAgent`] whose inference backend is a supervised local server.
///
/// The server is started by [`SupervisedVisionAgent::launch`] and only
/// stopped by [`SupervisedVisionAgent::shutdown`].
pub struct SupervisedVisionAgent<L, P, C>
where
    L: ProcessLauncher,
    P: HealthProbe,
    C: Clock + Send + Sync,
{
    supervisor: InferenceServerSupervisor<L, P, C>,
    agent: VisionAgent<HttpInferenceClient>,
}

impl<L, P, C> SupervisedVisionAgent<L, P, C>
where
    L: ProcessLauncher,
    P: HealthProbe,
    C: Clock + Send + Sync,
{
    /// Starts the inference server and wires an agent to it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::agent::domain::AgentError::Supervisor`] when the
    /// server does not become healthy.
    pub async fn launch(
        config: InferenceServerConfig,
        registry: Arc<CapabilityRegistry>,
        launcher: Arc<L>,
        probe: Arc<P>,
        clock: Arc<C>,
    ) -> AgentResult<Self> {
        let mut supervisor = InferenceServerSupervisor::new(config, launcher, probe, clock);
        let client = supervisor.start().await?;
        info!(base_url = client.base_url(), "vision agent connected to inference server");
        Ok(Self {
            supervisor,
            agent: VisionAgent::new(registry, Arc::new(client)),
        })
    }

    /// Replaces the agent's tool selector.
    #[must_use]
    pub fn with_selector(mut self, selector: ToolSelector) -> Self {
        self.agent = self.agent.with_selector(selector);
        self
    }

    /// Returns the agent.
    #[must_use]
    pub const fn agent(&self) -> &VisionAgent<HttpInferenceClient> {
        &self.agent
    }

    /// Returns the supervisor.
    #[must_use]
    pub const fn supervisor(&self) -> &InferenceServerSupervisor<L, P, C> {
        &self.supervisor
    }

    /// Stops the inference server.
    ///
    /// # Errors
    ///
    /// Returns [`crate::agent::domain::AgentError::Supervisor`] when the
    /// process cannot be stopped cleanly.
    pub async fn shutdown(&mut self) -> AgentResult<()> {
        self.supervisor.stop().await?;
        Ok(())
    }
}
