//! Domain model for inference server supervision.

mod config;
mod error;
mod handle;
mod health;
mod ids;
mod launch;
mod state;

pub use config::{ENV_PREFIX, InferenceServerConfig, ServerAddress};
pub use error::{ConfigurationError, ServerDomainError};
pub use handle::ServerHandle;
pub use health::{ServerHealthSnapshot, ServerHealthStatus};
pub use ids::ServerSessionId;
pub use launch::{EntryPoint, LaunchCommand};
pub use state::ServerState;
