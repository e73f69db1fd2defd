//! Mask generation backed by a Segment Anything model.

use super::{ModelSlot, ensure_image, model_parameters, model_spec};
use crate::capability::{
    domain::{
        CapabilityDomainError, CapabilityResult, ImageRef, ParameterType, ToolArguments,
        ToolDescriptor, ToolId, ToolParameter, text_argument,
    },
    ports::{Capability, PredictRequest},
    services::ModelCatalog,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const SAM_MODEL: &str = "SAM-ViT-H";
const SAM_CHECKPOINT: &str = "sam_vit_h_4b8939.pth";

fn segmentation_descriptor(
    identifier: &str,
    description: &str,
) -> Result<ToolDescriptor, CapabilityDomainError> {
    let mut descriptor = ToolDescriptor::new(ToolId::new(identifier)?, description);
    for parameter in model_parameters(SAM_MODEL, SAM_CHECKPOINT)? {
        descriptor = descriptor.with_input(parameter);
    }
    Ok(descriptor.with_output(
        ToolParameter::new("masks", ParameterType::Json)?
            .with_description("Segmentation masks and a short summary"),
    ))
}

/// Adds a human-readable summary when the model reports a `masks` array.
fn summarise(mut output: Value) -> Value {
    let count = output
        .get("masks")
        .and_then(Value::as_array)
        .map(Vec::len);
    if let Some(count) = count
        && let Some(fields) = output.as_object_mut()
    {
        fields.insert(
            "summary".to_owned(),
            Value::from(format!("Segmentation completed, detected {count} objects")),
        );
    }
    output
}

/// Segments every object in an image.
pub struct SegmentAnything {
    slot: ModelSlot,
}

impl SegmentAnything {
    /// Registry identifier of the tool.
    pub const IDENTIFIER: &'static str = "SegmentAnything";

    /// Describes the tool's constructor arguments and output.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError`] if a parameter name is invalid.
    pub fn descriptor() -> Result<ToolDescriptor, CapabilityDomainError> {
        segmentation_descriptor(
            Self::IDENTIFIER,
            "Segment images using Segment Anything model",
        )
    }

    /// Builds the tool from resolved constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when a model argument is missing or not text.
    pub fn from_arguments(
        arguments: &ToolArguments,
        catalog: Arc<ModelCatalog>,
    ) -> CapabilityResult<Self> {
        Ok(Self {
            slot: ModelSlot::new(model_spec(arguments)?, catalog),
        })
    }
}

impl Capability for SegmentAnything {
    fn setup(&mut self) -> CapabilityResult<()> {
        self.slot.load()
    }

    fn apply(&mut self, image: &ImageRef, _arguments: &ToolArguments) -> CapabilityResult<Value> {
        ensure_image(image)?;
        debug!(%image, "segmenting image");
        let output = self.slot.model()?.predict(image, &PredictRequest::new())?;
        Ok(summarise(output))
    }
}

/// Segments the object named by a text prompt.
pub struct SegmentObject {
    slot: ModelSlot,
    prompt: Option<String>,
}

impl SegmentObject {
    /// Registry identifier of the tool.
    pub const IDENTIFIER: &'static str = "SegmentObject";

    /// Describes the tool's constructor arguments and output.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError`] if a parameter name is invalid.
    pub fn descriptor() -> Result<ToolDescriptor, CapabilityDomainError> {
        Ok(
            segmentation_descriptor(Self::IDENTIFIER, "Segment specific objects in images")?
                .with_input(
                    ToolParameter::new("prompt", ParameterType::Text)?
                        .with_description("Name of the object to segment")
                        .optional(),
                ),
        )
    }

    /// Builds the tool from resolved constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when a model argument is missing or not text.
    pub fn from_arguments(
        arguments: &ToolArguments,
        catalog: Arc<ModelCatalog>,
    ) -> CapabilityResult<Self> {
        Ok(Self {
            slot: ModelSlot::new(model_spec(arguments)?, catalog),
            prompt: prompt(arguments)?,
        })
    }
}

fn prompt(arguments: &ToolArguments) -> CapabilityResult<Option<String>> {
    if arguments.contains_key("prompt") {
        Ok(Some(text_argument(arguments, "prompt")?.to_owned()))
    } else {
        Ok(None)
    }
}

impl Capability for SegmentObject {
    fn setup(&mut self) -> CapabilityResult<()> {
        self.slot.load()
    }

    fn apply(&mut self, image: &ImageRef, arguments: &ToolArguments) -> CapabilityResult<Value> {
        ensure_image(image)?;
        let mut request = PredictRequest::new();
        if let Some(object) = prompt(arguments)?.or_else(|| self.prompt.clone()) {
            request = request.with_prompt(object);
        }
        debug!(%image, prompt = ?request.prompt(), "segmenting object");
        let output = self.slot.model()?.predict(image, &request)?;
        Ok(summarise(output))
    }
}
