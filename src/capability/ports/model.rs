//! Boundary to the concrete vision models backing built-in tools.

use crate::capability::domain::{CapabilityResult, ImageRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Identifies which model weights a tool wants loaded, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    name: String,
    checkpoint: String,
    device: String,
}

impl ModelSpec {
    /// Creates a model specification.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        checkpoint: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            checkpoint: checkpoint.into(),
            device: device.into(),
        }
    }

    /// Returns the catalog name of the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the checkpoint path or hub reference.
    #[must_use]
    pub fn checkpoint(&self) -> &str {
        &self.checkpoint
    }

    /// Returns the compute device, e.g. `cpu` or `cuda:0`.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }
}

/// Per-call inference parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    confidence_threshold: Option<f64>,
    prompt: Option<String>,
}

impl PredictRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum confidence for reported detections.
    #[must_use]
    pub const fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    /// Sets a text prompt naming the object of interest.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Returns the confidence threshold.
    #[must_use]
    pub const fn confidence_threshold(&self) -> Option<f64> {
        self.confidence_threshold
    }

    /// Returns the object prompt.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }
}

/// A loaded vision model.
pub trait VisionModel: Send {
    /// Runs inference and returns model-specific JSON output.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`](crate::capability::domain::CapabilityError)
    /// when inference fails.
    fn predict(&mut self, image: &ImageRef, request: &PredictRequest) -> CapabilityResult<Value>;
}

/// Loads model weights on demand.
pub trait ModelLoader: Send + Sync {
    /// Loads the model described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`](crate::capability::domain::CapabilityError)
    /// when the weights cannot be loaded.
    fn load(&self, spec: &ModelSpec) -> CapabilityResult<Box<dyn VisionModel>>;
}

impl<F> ModelLoader for F
where
    F: Fn(&ModelSpec) -> CapabilityResult<Box<dyn VisionModel>> + Send + Sync,
{
    fn load(&self, spec: &ModelSpec) -> CapabilityResult<Box<dyn VisionModel>> {
        self(spec)
    }
}

/// Wraps a closure as a shareable model loader.
pub fn model_loader<F>(loader: F) -> Arc<dyn ModelLoader>
where
    F: Fn(&ModelSpec) -> CapabilityResult<Box<dyn VisionModel>> + Send + Sync + 'static,
{
    Arc::new(loader)
}
