//! Lazily initialised capability bound to its descriptor.

use crate::capability::{
    domain::{CapabilityResult, ImageRef, InstanceState, ToolArguments, ToolDescriptor, ToolId},
    ports::Capability,
};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// A constructed tool that runs `setup` once, on first invocation.
///
/// The instance is owned by whoever built it and is not shared across
/// calls unless that caller chooses to keep it.
pub struct CapabilityInstance {
    descriptor: ToolDescriptor,
    capability: Box<dyn Capability>,
    state: InstanceState,
}

impl CapabilityInstance {
    /// Wraps an unconfigured capability.
    #[must_use]
    pub fn new(descriptor: ToolDescriptor, capability: Box<dyn Capability>) -> Self {
        Self {
            descriptor,
            capability,
            state: InstanceState::Unconfigured,
        }
    }

    /// Returns the descriptor the instance was built from.
    #[must_use]
    pub const fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Returns the tool identifier.
    #[must_use]
    pub const fn identifier(&self) -> &ToolId {
        self.descriptor.identifier()
    }

    /// Returns the setup state.
    #[must_use]
    pub const fn state(&self) -> InstanceState {
        self.state
    }

    /// Runs `setup` if it has not completed yet.
    ///
    /// A failed setup leaves the instance unconfigured, so a later call
    /// retries it.
    ///
    /// # Errors
    ///
    /// Returns the capability's setup error.
    pub fn ensure_ready(&mut self) -> CapabilityResult<()> {
        if self.state == InstanceState::Ready {
            return Ok(());
        }

        debug!(tool = %self.descriptor.identifier(), "running capability setup");
        self.capability.setup()?;
        self.state = InstanceState::Ready;
        Ok(())
    }

    /// Ensures the instance is ready, then applies it to `image`.
    ///
    /// # Errors
    ///
    /// Returns setup or apply errors raised by the capability.
    pub fn invoke(&mut self, image: &ImageRef, arguments: &ToolArguments) -> CapabilityResult<Value> {
        self.ensure_ready()?;
        self.capability.apply(image, arguments)
    }
}

impl fmt::Debug for CapabilityInstance {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CapabilityInstance")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
