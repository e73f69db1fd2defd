//! Domain model for tool selection and agent errors.

mod error;
mod selection;

pub use error::{AgentError, AgentResult, ERROR_PREFIX, SelectorError};
pub use selection::{
    SelectionRequest, SelectionResult, SelectionSource, ToolSelection, normalize_selection,
};
