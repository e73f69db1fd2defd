//! Process launch port.

use crate::server::domain::LaunchCommand;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by process adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// The executable could not be started.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Executable name.
        program: String,
        /// OS error text.
        message: String,
    },

    /// A signal could not be delivered.
    #[error("failed to signal process {pid}: {message}")]
    Signal {
        /// Target process.
        pid: u32,
        /// OS error text.
        message: String,
    },

    /// Waiting on the process failed.
    #[error("failed to wait for process: {0}")]
    Wait(String),
}

/// A running child process owned by the supervisor.
///
/// Dropping the value must kill the process.
#[async_trait]
pub trait ManagedProcess: Send {
    /// Returns the OS process identifier, when known.
    fn id(&self) -> Option<u32>;

    /// Returns a description of the exit status once the process has exited.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Wait`] when the status cannot be read.
    fn exit_status(&mut self) -> Result<Option<String>, ProcessError>;

    /// Asks the process to stop, force-killing it after `grace`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] when signalling or reaping fails.
    async fn terminate(&mut self, grace: Duration) -> Result<(), ProcessError>;
}

/// Starts server processes.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Process handle produced by the launcher.
    type Process: ManagedProcess;

    /// Spawns `command` without waiting for it to finish.
    async fn launch(&self, command: &LaunchCommand) -> Result<Self::Process, ProcessError>;
}
