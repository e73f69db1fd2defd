//! Error types for tool metadata validation and capability execution.

use std::sync::Arc;
use thiserror::Error;

/// Errors returned while constructing tool domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityDomainError {
    /// The tool identifier is empty after trimming.
    #[error("tool identifier must not be empty")]
    EmptyToolId,

    /// A parameter name is empty after trimming.
    #[error("parameter name must not be empty")]
    EmptyParameterName,
}

/// Result type for capability construction and execution.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Errors raised by capability factories, `setup`, and `apply`.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// A required constructor or apply argument was not supplied.
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// An argument was supplied with the wrong shape.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Validation failure detail.
        reason: String,
    },

    /// The image handle does not resolve to a readable file.
    #[error("image file not found: {0}")]
    ImageNotFound(String),

    /// No loader is registered for the requested model.
    #[error("model '{name}' is not registered (available models: {available})")]
    ModelNotFound {
        /// Requested model name.
        name: String,
        /// Comma-separated list of registered model names.
        available: String,
    },

    /// Lazy initialisation of the tool failed.
    #[error("setup failed: {0}")]
    SetupFailed(String),

    /// Running the tool against an image failed.
    #[error("apply failed: {0}")]
    ApplyFailed(String),

    /// Generic runtime failure inside a tool or model adapter.
    #[error("capability runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl CapabilityError {
    /// Wraps an arbitrary runtime error from a tool or model adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }

    /// Returns whether the error stems from caller-supplied configuration.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_) | Self::InvalidArgument { .. }
        )
    }
}
