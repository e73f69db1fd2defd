//! Port contracts for launching and probing the inference server.

mod probe;
mod process;

pub use probe::{HealthProbe, HealthProbeError};
pub use process::{ManagedProcess, ProcessError, ProcessLauncher};
