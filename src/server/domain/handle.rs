//! Record of one running server session.

use super::{EntryPoint, ServerAddress, ServerHealthSnapshot, ServerSessionId, ServerState};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Session record owned by the supervisor while a process exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHandle {
    session_id: ServerSessionId,
    process_id: Option<u32>,
    address: ServerAddress,
    entry_point: EntryPoint,
    state: ServerState,
    started_at: DateTime<Utc>,
    last_health: ServerHealthSnapshot,
}

impl ServerHandle {
    /// Creates a handle for a freshly launched process in state `starting`.
    #[must_use]
    pub fn new(
        session_id: ServerSessionId,
        process_id: Option<u32>,
        address: ServerAddress,
        entry_point: EntryPoint,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            session_id,
            process_id,
            address,
            entry_point,
            state: ServerState::Starting,
            started_at: timestamp,
            last_health: ServerHealthSnapshot::unknown(timestamp),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn session_id(&self) -> ServerSessionId {
        self.session_id
    }

    /// Returns the OS process identifier, when known.
    #[must_use]
    pub const fn process_id(&self) -> Option<u32> {
        self.process_id
    }

    /// Returns the bound address.
    #[must_use]
    pub const fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Returns the entry point that was started.
    #[must_use]
    pub const fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    /// Returns the session state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns when the process was launched.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the latest health snapshot.
    #[must_use]
    pub const fn last_health(&self) -> &ServerHealthSnapshot {
        &self.last_health
    }

    pub(crate) const fn set_state(&mut self, state: ServerState) {
        self.state = state;
    }

    pub(crate) fn record_health(&mut self, snapshot: ServerHealthSnapshot) {
        self.last_health = snapshot;
    }
}
