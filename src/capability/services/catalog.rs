//! Catalogue of lazily loaded vision models.

use crate::capability::{
    domain::{CapabilityError, CapabilityResult},
    ports::{ModelLoader, ModelSpec, VisionModel},
};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Maps model names to loaders so weights are only read on first use.
///
/// Like [`CapabilityRegistry`](super::CapabilityRegistry), names keep their
/// registration order and re-registration replaces the loader in place.
#[derive(Default)]
pub struct ModelCatalog {
    loaders: RwLock<Vec<(String, Arc<dyn ModelLoader>)>>,
}

fn poisoned(err: &impl ToString) -> CapabilityError {
    CapabilityError::runtime(std::io::Error::other(err.to_string()))
}

impl ModelCatalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the loader for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidArgument`] for a blank name and
    /// [`CapabilityError::Runtime`] when the lock is poisoned.
    pub fn register(
        &self,
        name: impl Into<String>,
        loader: Arc<dyn ModelLoader>,
    ) -> CapabilityResult<()> {
        let normalized = name.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(CapabilityError::InvalidArgument {
                name: "model_name".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        let mut loaders = self.loaders.write().map_err(|err| poisoned(&err))?;
        if let Some(slot) = loaders.iter_mut().find(|(existing, _)| *existing == normalized) {
            slot.1 = loader;
            return Ok(());
        }
        loaders.push((normalized, loader));
        Ok(())
    }

    /// Returns registered model names in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Runtime`] when the lock is poisoned.
    pub fn list(&self) -> CapabilityResult<Vec<String>> {
        let loaders = self.loaders.read().map_err(|err| poisoned(&err))?;
        Ok(loaders.iter().map(|(name, _)| name.clone()).collect())
    }

    /// Loads the model named by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::ModelNotFound`] listing the known models
    /// when no loader matches, or the loader's own error.
    pub fn load(&self, spec: &ModelSpec) -> CapabilityResult<Box<dyn VisionModel>> {
        let loader = {
            let loaders = self.loaders.read().map_err(|err| poisoned(&err))?;
            let found = loaders
                .iter()
                .find(|(name, _)| name == spec.name())
                .map(|(_, loader)| Arc::clone(loader));
            let Some(loader) = found else {
                let available = if loaders.is_empty() {
                    "none".to_owned()
                } else {
                    loaders
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                return Err(CapabilityError::ModelNotFound {
                    name: spec.name().to_owned(),
                    available,
                });
            };
            loader
        };

        debug!(
            model = spec.name(),
            checkpoint = spec.checkpoint(),
            device = spec.device(),
            "loading vision model"
        );
        loader.load(spec)
    }
}
