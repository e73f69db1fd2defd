//! Built-in vision tools and their explicit registration.
//!
//! The tools wrap models resolved from a [`ModelCatalog`]; loading is
//! deferred to `setup`, so registering them is cheap even when no model
//! weights are available.

mod detection;
mod segmentation;

pub use detection::YoloDetect;
pub use segmentation::{SegmentAnything, SegmentObject};

use crate::capability::{
    domain::{
        CapabilityDomainError, CapabilityError, CapabilityResult, ImageRef, ParameterType, ToolArguments,
        ToolDescriptor, ToolParameter, text_argument,
    },
    ports::{Capability, ModelSpec, VisionModel, capability_factory},
    services::{CapabilityRegistry, CapabilityRegistryResult, ModelCatalog},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Registers every built-in tool with `registry`.
///
/// Call once during start-up, before the first lookup.
///
/// # Errors
///
/// Returns registry errors when registration fails.
pub fn register_builtin_tools(
    registry: &CapabilityRegistry,
    catalog: &Arc<ModelCatalog>,
) -> CapabilityRegistryResult<()> {
    register_tool(
        registry,
        YoloDetect::descriptor()?,
        Arc::clone(catalog),
        YoloDetect::from_arguments,
    )?;
    register_tool(
        registry,
        SegmentAnything::descriptor()?,
        Arc::clone(catalog),
        SegmentAnything::from_arguments,
    )?;
    register_tool(
        registry,
        SegmentObject::descriptor()?,
        Arc::clone(catalog),
        SegmentObject::from_arguments,
    )?;

    info!(tools = registry.len()?, "registered built-in vision tools");
    Ok(())
}

fn register_tool<T, B>(
    registry: &CapabilityRegistry,
    descriptor: ToolDescriptor,
    catalog: Arc<ModelCatalog>,
    build: B,
) -> CapabilityRegistryResult<()>
where
    T: Capability + 'static,
    B: Fn(&ToolArguments, Arc<ModelCatalog>) -> CapabilityResult<T> + Send + Sync + 'static,
{
    let schema = descriptor.clone();
    let factory = capability_factory(move |arguments: &ToolArguments| {
        let resolved = schema.resolve_arguments(arguments)?;
        let tool = build(&resolved, Arc::clone(&catalog))?;
        Ok(Box::new(tool) as Box<dyn Capability>)
    });
    let identifier = descriptor.identifier().to_string();
    registry.register(identifier, factory, descriptor)
}

/// Constructor parameters shared by every model-backed tool.
fn model_parameters(
    default_model: &str,
    default_checkpoint: &str,
) -> Result<[ToolParameter; 4], CapabilityDomainError> {
    Ok([
        ToolParameter::new("image", ParameterType::Image)?
            .with_description("Image to analyse"),
        ToolParameter::new("model_name", ParameterType::Text)?
            .with_description("Model catalogue entry to load")
            .with_default(Value::from(default_model)),
        ToolParameter::new("model_path", ParameterType::Text)?
            .with_description("Checkpoint path or hub reference")
            .with_default(Value::from(default_checkpoint)),
        ToolParameter::new("device", ParameterType::Text)?
            .with_description("Compute device, e.g. cpu or cuda:0")
            .with_default(Value::from("cpu")),
    ])
}

fn model_spec(arguments: &ToolArguments) -> CapabilityResult<ModelSpec> {
    Ok(ModelSpec::new(
        text_argument(arguments, "model_name")?,
        text_argument(arguments, "model_path")?,
        text_argument(arguments, "device")?,
    ))
}

/// Lazily loaded model handle shared by the built-in tools.
struct ModelSlot {
    spec: ModelSpec,
    catalog: Arc<ModelCatalog>,
    model: Option<Box<dyn VisionModel>>,
}

impl ModelSlot {
    const fn new(spec: ModelSpec, catalog: Arc<ModelCatalog>) -> Self {
        Self {
            spec,
            catalog,
            model: None,
        }
    }

    fn load(&mut self) -> CapabilityResult<()> {
        if self.model.is_none() {
            let model = self.catalog.load(&self.spec).map_err(|err| match err {
                CapabilityError::ModelNotFound { .. } => err,
                other => CapabilityError::SetupFailed(format!(
                    "failed to load model {}: {other}",
                    self.spec.name()
                )),
            })?;
            self.model = Some(model);
        }
        Ok(())
    }

    fn model(&mut self) -> CapabilityResult<&mut Box<dyn VisionModel>> {
        self.load()?;
        self.model
            .as_mut()
            .ok_or_else(|| CapabilityError::SetupFailed("model was not loaded".to_owned()))
    }
}

fn ensure_image(image: &ImageRef) -> CapabilityResult<()> {
    if image.exists() {
        Ok(())
    } else {
        Err(CapabilityError::ImageNotFound(image.to_string()))
    }
}
