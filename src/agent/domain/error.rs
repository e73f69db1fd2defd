//! Error types for selection and orchestration.

use crate::capability::{domain::CapabilityError, services::CapabilityRegistryError};
use crate::inference::domain::InferenceError;
use crate::server::services::SupervisorError;
use thiserror::Error;

/// Prefix of every error string returned by the agent.
pub const ERROR_PREFIX: &str = "[vision-agent error]";

/// Errors raised while asking the model for a tool.
#[derive(Debug, Clone, Error)]
pub enum SelectorError {
    /// The selection prompt template failed to render.
    #[error("failed to render tool selection prompt: {0}")]
    TemplateRender(String),

    /// The inference backend failed.
    #[error("tool selection failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Aggregate error of the agent orchestrator.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Tool selection failed.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// The registry rejected a lookup.
    #[error(transparent)]
    Registry(#[from] CapabilityRegistryError),

    /// The tool could not be built or failed while running.
    #[error("tool '{tool}' failed: {source}")]
    CapabilityFailure {
        /// Tool identifier.
        tool: String,
        /// Underlying capability error.
        source: CapabilityError,
    },

    /// There is nothing to choose from.
    #[error("no tools are registered")]
    NoToolsRegistered,

    /// The inference server could not be managed.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
