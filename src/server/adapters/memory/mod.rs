//! In-memory launcher and probe for deterministic supervisor tests.

mod launcher;
mod probe;

pub use launcher::{InMemoryProcess, InMemoryProcessLauncher, LaunchBehaviour};
pub use probe::ScriptedHealthProbe;
