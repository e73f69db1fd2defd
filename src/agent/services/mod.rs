//! Service layer for tool selection and request orchestration.

mod orchestrator;
mod selector;
mod supervised;

pub use orchestrator::VisionAgent;
pub use selector::{DEFAULT_SELECTION_TEMPLATE, ToolSelector};
pub use supervised::SupervisedVisionAgent;
