//! OS process launcher built on `tokio::process`.
//!
//! On Unix each server becomes its own process-group leader, so stopping it
//! also reaches the worker processes it forks.

use crate::server::{
    domain::LaunchCommand,
    ports::{ManagedProcess, ProcessError, ProcessLauncher},
};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Launches server commands as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    /// Creates a launcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    type Process = TokioManagedProcess;

    async fn launch(&self, command: &LaunchCommand) -> Result<Self::Process, ProcessError> {
        let mut process = Command::new(command.program());
        process
            .args(command.args())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        process.process_group(0);

        let child = process.spawn().map_err(|err| ProcessError::Spawn {
            program: command.program().to_owned(),
            message: err.to_string(),
        })?;
        info!(pid = child.id(), %command, "spawned inference server process");
        Ok(TokioManagedProcess { child })
    }
}

/// Child process started by [`TokioProcessLauncher`].
///
/// Dropping an unreaped child kills its whole process group.
#[derive(Debug)]
pub struct TokioManagedProcess {
    child: Child,
}

impl TokioManagedProcess {
    fn has_exited(&mut self) -> Result<bool, ProcessError> {
        Ok(self.exit_status()?.is_some())
    }
}

#[async_trait]
impl ManagedProcess for TokioManagedProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn exit_status(&mut self) -> Result<Option<String>, ProcessError> {
        self.child
            .try_wait()
            .map(|status| status.map(|code| code.to_string()))
            .map_err(|err| ProcessError::Wait(err.to_string()))
    }

    async fn terminate(&mut self, grace: Duration) -> Result<(), ProcessError> {
        if self.has_exited()? {
            return Ok(());
        }
        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        send_signal(pid, Termination::Graceful)?;
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(waited) => {
                let status = waited.map_err(|err| ProcessError::Wait(err.to_string()))?;
                debug!(pid, %status, "inference server exited after SIGTERM");
                Ok(())
            }
            Err(_) => {
                warn!(pid, ?grace, "inference server ignored SIGTERM; killing it");
                send_signal(pid, Termination::Forced)?;
                self.child
                    .start_kill()
                    .map_err(|err| ProcessError::Wait(err.to_string()))?;
                self.child
                    .wait()
                    .await
                    .map(|_| ())
                    .map_err(|err| ProcessError::Wait(err.to_string()))
            }
        }
    }
}

impl Drop for TokioManagedProcess {
    fn drop(&mut self) {
        // `id` is `None` once the child has been reaped, so the group id
        // cannot have been reused yet.
        let Some(pid) = self.child.id() else {
            return;
        };
        if let Err(err) = send_signal(pid, Termination::Forced) {
            warn!(pid, error = %err, "failed to kill inference server process group");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Termination {
    Graceful,
    Forced,
}

#[cfg(unix)]
fn send_signal(pid: u32, termination: Termination) -> Result<(), ProcessError> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|err| ProcessError::Signal {
        pid,
        message: err.to_string(),
    })?;
    let signal = match termination {
        Termination::Graceful => Signal::SIGTERM,
        Termination::Forced => Signal::SIGKILL,
    };
    match killpg(Pid::from_raw(raw), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(err) => Err(ProcessError::Signal {
            pid,
            message: err.to_string(),
        }),
    }
}

// No process groups here; the forced path falls back to `Child::start_kill`.
#[cfg(not(unix))]
const fn send_signal(_pid: u32, _termination: Termination) -> Result<(), ProcessError> {
    Ok(())
}
