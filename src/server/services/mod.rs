//! Service layer for inference server supervision.

mod supervisor;

pub use supervisor::{InferenceServerSupervisor, SupervisorError, SupervisorResult};
