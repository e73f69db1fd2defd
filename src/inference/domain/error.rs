//! Error types for inference requests.

use thiserror::Error;

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors returned by inference clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// The request never produced an HTTP response.
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying transport error.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Endpoint URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {endpoint}: {reason}")]
    Schema {
        /// Endpoint URL.
        endpoint: String,
        /// What was missing or malformed.
        reason: String,
    },

    /// Neither dialect produced a completion.
    #[error("inference backend unavailable (modern: {modern}; legacy: {legacy})")]
    BackendUnavailable {
        /// Failure of the modern dialect.
        modern: String,
        /// Failure of the legacy dialect.
        legacy: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// A scripted client ran out of queued responses.
    #[error("no scripted inference response left")]
    NoScriptedResponse,
}
