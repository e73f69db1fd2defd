//! Uniform contract every vision tool satisfies.

use crate::capability::domain::{CapabilityResult, ImageRef, ToolArguments};
use serde_json::Value;
use std::sync::Arc;

/// A concrete vision tool.
///
/// `setup` performs heavyweight initialisation such as loading model
/// weights. Callers run it at most once before the first `apply`; see
/// [`CapabilityInstance`](crate::capability::services::CapabilityInstance).
pub trait Capability: Send {
    /// Prepares the tool for use.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`](crate::capability::domain::CapabilityError)
    /// when initialisation fails.
    fn setup(&mut self) -> CapabilityResult<()> {
        Ok(())
    }

    /// Runs the tool against an image.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`](crate::capability::domain::CapabilityError)
    /// when the image cannot be processed.
    fn apply(&mut self, image: &ImageRef, arguments: &ToolArguments) -> CapabilityResult<Value>;
}

/// Late-bound constructor for a capability.
pub trait CapabilityFactory: Send + Sync {
    /// Builds a new, unconfigured capability from caller arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`](crate::capability::domain::CapabilityError)
    /// when the arguments cannot configure the tool.
    fn create(&self, arguments: &ToolArguments) -> CapabilityResult<Box<dyn Capability>>;
}

impl<F> CapabilityFactory for F
where
    F: Fn(&ToolArguments) -> CapabilityResult<Box<dyn Capability>> + Send + Sync,
{
    fn create(&self, arguments: &ToolArguments) -> CapabilityResult<Box<dyn Capability>> {
        self(arguments)
    }
}

/// Wraps a closure as a shareable capability factory.
pub fn capability_factory<F>(factory: F) -> Arc<dyn CapabilityFactory>
where
    F: Fn(&ToolArguments) -> CapabilityResult<Box<dyn Capability>> + Send + Sync + 'static,
{
    Arc::new(factory)
}
