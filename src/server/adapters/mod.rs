//! Adapter implementations of the server ports.

pub mod memory;
mod probe;
mod process;

pub use probe::HttpHealthProbe;
pub use process::{TokioManagedProcess, TokioProcessLauncher};
