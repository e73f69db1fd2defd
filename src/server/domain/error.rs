//! Error types for server domain validation.

use thiserror::Error;

/// Errors raised by the server state machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerDomainError {
    /// Transitioning between two lifecycle states is invalid.
    #[error("invalid inference server state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Requested target state.
        to: String,
    },
}

/// Errors returned while building an inference server configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No model path was supplied.
    #[error("model path must not be empty")]
    MissingModelPath,

    /// The bind host is empty after trimming.
    #[error("server host must not be empty")]
    EmptyHost,

    /// Port zero cannot be probed.
    #[error("server port must be between 1 and 65535")]
    InvalidPort,

    /// GPU memory utilisation must lie in `(0, 1]`.
    #[error("GPU memory utilisation {0} is outside (0, 1]")]
    InvalidGpuMemoryUtilization(String),

    /// The interpreter command is empty after trimming.
    #[error("python interpreter must not be empty")]
    EmptyInterpreter,

    /// A duration that bounds a wait loop was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// An environment variable could not be parsed.
    #[error("environment variable {variable}={value:?} is invalid: {reason}")]
    InvalidEnvironmentValue {
        /// Variable name.
        variable: String,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },
}
