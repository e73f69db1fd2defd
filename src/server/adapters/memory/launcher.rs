//! In-memory process launcher.

use crate::server::{
    domain::{EntryPoint, LaunchCommand},
    ports::{ManagedProcess, ProcessError, ProcessLauncher},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// How a simulated launch of an entry point behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchBehaviour {
    /// The process starts and keeps running.
    Run,
    /// Spawning fails with the given message.
    FailToSpawn(String),
    /// The process starts and exits at once with the given code.
    ExitImmediately(i32),
    /// The process starts but reading its exit status fails with the given
    /// message.
    Unobservable(String),
}

#[derive(Debug, Default)]
struct LauncherState {
    behaviours: HashMap<EntryPoint, LaunchBehaviour>,
    launched: Vec<LaunchCommand>,
    live: HashSet<u32>,
    exited: HashMap<u32, i32>,
    next_id: u32,
}

/// Process launcher that simulates children without spawning anything.
///
/// Entry points run normally unless configured otherwise. Live processes
/// are tracked so tests can assert that at most one exists.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessLauncher {
    state: Arc<RwLock<LauncherState>>,
}

fn poisoned(err: &impl ToString) -> ProcessError {
    ProcessError::Wait(err.to_string())
}

impl InMemoryProcessLauncher {
    /// Creates a launcher where every entry point runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the behaviour for `entry_point`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Wait`] when the state lock is poisoned.
    pub fn set_behaviour(
        &self,
        entry_point: EntryPoint,
        behaviour: LaunchBehaviour,
    ) -> Result<(), ProcessError> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.behaviours.insert(entry_point, behaviour);
        Ok(())
    }

    /// Returns every command launched so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Wait`] when the state lock is poisoned.
    pub fn launched(&self) -> Result<Vec<LaunchCommand>, ProcessError> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.launched.clone())
    }

    /// Returns how many simulated processes are still alive.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Wait`] when the state lock is poisoned.
    pub fn live_count(&self) -> Result<usize, ProcessError> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.live.len())
    }

    /// Makes every live process exit with `code`, as if it had crashed.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Wait`] when the state lock is poisoned.
    pub fn exit_live(&self, code: i32) -> Result<(), ProcessError> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        let crashed: Vec<u32> = state.live.drain().collect();
        state.exited.extend(crashed.into_iter().map(|id| (id, code)));
        Ok(())
    }
}

#[async_trait]
impl ProcessLauncher for InMemoryProcessLauncher {
    type Process = InMemoryProcess;

    async fn launch(&self, command: &LaunchCommand) -> Result<Self::Process, ProcessError> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.launched.push(command.clone());
        let behaviour = state
            .behaviours
            .get(&command.entry_point())
            .cloned()
            .unwrap_or(LaunchBehaviour::Run);

        let (exit_code, status_error) = match behaviour {
            LaunchBehaviour::FailToSpawn(message) => {
                return Err(ProcessError::Spawn {
                    program: command.program().to_owned(),
                    message,
                });
            }
            LaunchBehaviour::ExitImmediately(code) => (Some(code), None),
            LaunchBehaviour::Run => (None, None),
            LaunchBehaviour::Unobservable(message) => (None, Some(message)),
        };

        state.next_id = state.next_id.saturating_add(1);
        let id = state.next_id;
        if exit_code.is_none() {
            state.live.insert(id);
        }
        Ok(InMemoryProcess {
            id,
            exit_code,
            status_error,
            launcher: Arc::clone(&self.state),
        })
    }
}

/// Simulated child process.
///
/// Dropping it removes it from the launcher's live set.
#[derive(Debug)]
pub struct InMemoryProcess {
    id: u32,
    exit_code: Option<i32>,
    status_error: Option<String>,
    launcher: Arc<RwLock<LauncherState>>,
}

impl InMemoryProcess {
    fn reap(&self) -> Result<(), ProcessError> {
        let mut state = self.launcher.write().map_err(|err| poisoned(&err))?;
        state.live.remove(&self.id);
        Ok(())
    }
}

#[async_trait]
impl ManagedProcess for InMemoryProcess {
    fn id(&self) -> Option<u32> {
        Some(self.id)
    }

    fn exit_status(&mut self) -> Result<Option<String>, ProcessError> {
        if let Some(message) = &self.status_error {
            return Err(ProcessError::Wait(message.clone()));
        }
        if self.exit_code.is_none() {
            let state = self.launcher.read().map_err(|err| poisoned(&err))?;
            self.exit_code = state.exited.get(&self.id).copied();
        }
        Ok(self.exit_code.map(|code| format!("exit status: {code}")))
    }

    async fn terminate(&mut self, _grace: Duration) -> Result<(), ProcessError> {
        self.reap()?;
        if self.exit_code.is_none() {
            self.exit_code = Some(0);
        }
        Ok(())
    }
}

impl Drop for InMemoryProcess {
    fn drop(&mut self) {
        if let Ok(mut state) = self.launcher.write() {
            state.live.remove(&self.id);
        }
    }
}
