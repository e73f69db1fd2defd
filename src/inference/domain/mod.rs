//! Domain model for inference requests.

mod dialect;
mod error;
mod message;
mod options;

pub use dialect::WireDialect;
pub use error::{InferenceError, InferenceResult};
pub use message::{ChatMessage, ChatRole, flatten_messages};
pub use options::InferenceOptions;
