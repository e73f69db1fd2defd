//! Tool registry mapping identifiers to factories and descriptors.

use crate::capability::{
    domain::{CapabilityDomainError, CapabilityError, ToolArguments, ToolDescriptor, ToolId},
    ports::CapabilityFactory,
    services::CapabilityInstance,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

/// Result type for registry operations.
pub type CapabilityRegistryResult<T> = Result<T, CapabilityRegistryError>;

/// Errors returned by [`CapabilityRegistry`].
#[derive(Debug, Clone, Error)]
pub enum CapabilityRegistryError {
    /// Registration input failed validation.
    #[error(transparent)]
    Domain(#[from] CapabilityDomainError),

    /// No tool is registered under the identifier.
    #[error("tool '{identifier}' is not registered (available tools: {available})")]
    NotFound {
        /// Requested identifier.
        identifier: String,
        /// Comma-separated list of registered identifiers.
        available: String,
    },

    /// The factory refused to build the tool.
    #[error(transparent)]
    Factory(#[from] CapabilityError),

    /// The registry lock was poisoned by a panicking writer.
    #[error("tool registry lock poisoned: {0}")]
    LockPoisoned(String),
}

#[derive(Clone)]
struct RegistryEntry {
    descriptor: ToolDescriptor,
    factory: Arc<dyn CapabilityFactory>,
}

#[derive(Default)]
struct RegistryState {
    entries: Vec<RegistryEntry>,
    index: HashMap<ToolId, usize>,
}

impl RegistryState {
    fn entry(&self, identifier: &str) -> CapabilityRegistryResult<&RegistryEntry> {
        self.index
            .get(identifier)
            .and_then(|position| self.entries.get(*position))
            .ok_or_else(|| CapabilityRegistryError::NotFound {
                identifier: identifier.to_owned(),
                available: self.available(),
            })
    }

    fn available(&self) -> String {
        if self.entries.is_empty() {
            return "none".to_owned();
        }
        self.entries
            .iter()
            .map(|entry| entry.descriptor.identifier().as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Thread-safe catalogue of vision tools.
///
/// Entries keep their registration order. Registering an identifier that
/// already exists replaces its factory and descriptor in place, so the
/// latest registration wins while the original position is preserved.
#[derive(Default)]
pub struct CapabilityRegistry {
    state: RwLock<RegistryState>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> CapabilityRegistryResult<RwLockReadGuard<'_, RegistryState>> {
        self.state
            .read()
            .map_err(|err| CapabilityRegistryError::LockPoisoned(err.to_string()))
    }

    fn write_state(&self) -> CapabilityRegistryResult<RwLockWriteGuard<'_, RegistryState>> {
        self.state
            .write()
            .map_err(|err| CapabilityRegistryError::LockPoisoned(err.to_string()))
    }

    /// Registers or replaces a tool.
    ///
    /// The descriptor is rebound to `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::Domain`] when the identifier is
    /// empty, or [`CapabilityRegistryError::LockPoisoned`].
    pub fn register(
        &self,
        identifier: impl Into<String>,
        factory: Arc<dyn CapabilityFactory>,
        descriptor: ToolDescriptor,
    ) -> CapabilityRegistryResult<()> {
        let tool_id = ToolId::new(identifier)?;
        let entry = RegistryEntry {
            descriptor: descriptor.with_identifier(tool_id.clone()),
            factory,
        };

        let mut state = self.write_state()?;
        let existing = state.index.get(&tool_id).copied();
        if let Some(position) = existing
            && let Some(slot) = state.entries.get_mut(position)
        {
            debug!(tool = %tool_id, "replacing registered tool");
            *slot = entry;
            return Ok(());
        }

        debug!(tool = %tool_id, "registering tool");
        let position = state.entries.len();
        state.entries.push(entry);
        state.index.insert(tool_id, position);
        Ok(())
    }

    /// Returns registered identifiers in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::LockPoisoned`].
    pub fn list(&self) -> CapabilityRegistryResult<Vec<ToolId>> {
        let state = self.read_state()?;
        Ok(state
            .entries
            .iter()
            .map(|entry| entry.descriptor.identifier().clone())
            .collect())
    }

    /// Returns `(identifier, description)` pairs in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::LockPoisoned`].
    pub fn list_with_descriptions(&self) -> CapabilityRegistryResult<Vec<(ToolId, String)>> {
        let state = self.read_state()?;
        Ok(state
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.descriptor.identifier().clone(),
                    entry.descriptor.description().to_owned(),
                )
            })
            .collect())
    }

    /// Returns full descriptors in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::LockPoisoned`].
    pub fn descriptors(&self) -> CapabilityRegistryResult<Vec<ToolDescriptor>> {
        let state = self.read_state()?;
        Ok(state
            .entries
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect())
    }

    /// Returns the number of registered tools.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::LockPoisoned`].
    pub fn len(&self) -> CapabilityRegistryResult<usize> {
        Ok(self.read_state()?.entries.len())
    }

    /// Returns whether no tools are registered.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::LockPoisoned`].
    pub fn is_empty(&self) -> CapabilityRegistryResult<bool> {
        Ok(self.read_state()?.entries.is_empty())
    }

    /// Returns whether `identifier` is registered, compared case-sensitively.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::LockPoisoned`].
    pub fn contains(&self, identifier: &str) -> CapabilityRegistryResult<bool> {
        let state = self.read_state()?;
        Ok(state.index.contains_key(identifier))
    }

    /// Returns the factory registered under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::NotFound`], whose message lists
    /// every registered identifier, or
    /// [`CapabilityRegistryError::LockPoisoned`].
    pub fn get(&self, identifier: &str) -> CapabilityRegistryResult<Arc<dyn CapabilityFactory>> {
        let state = self.read_state()?;
        Ok(Arc::clone(&state.entry(identifier)?.factory))
    }

    /// Returns the descriptor registered under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::NotFound`] or
    /// [`CapabilityRegistryError::LockPoisoned`].
    pub fn descriptor(&self, identifier: &str) -> CapabilityRegistryResult<ToolDescriptor> {
        let state = self.read_state()?;
        Ok(state.entry(identifier)?.descriptor.clone())
    }

    /// Builds an unconfigured instance of the tool.
    ///
    /// The registry lock is released before the factory runs, so factories
    /// may consult the registry themselves.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRegistryError::NotFound`] for unknown identifiers
    /// and [`CapabilityRegistryError::Factory`] carrying the factory's error
    /// unchanged.
    pub fn instantiate(
        &self,
        identifier: &str,
        arguments: &ToolArguments,
    ) -> CapabilityRegistryResult<CapabilityInstance> {
        let entry = {
            let state = self.read_state()?;
            state.entry(identifier)?.clone()
        };
        let capability = entry.factory.create(arguments)?;
        Ok(CapabilityInstance::new(entry.descriptor, capability))
    }
}
