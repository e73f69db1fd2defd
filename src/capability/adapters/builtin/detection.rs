//! Object detection backed by a YOLO-family model.

use super::{ModelSlot, ensure_image, model_parameters, model_spec};
use crate::capability::{
    domain::{
        CapabilityDomainError, CapabilityError, CapabilityResult, ImageRef, ParameterType,
        ToolArguments, ToolDescriptor, ToolId, ToolParameter, number_argument,
    },
    ports::{Capability, PredictRequest},
    services::ModelCatalog,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Detects objects and reports their boxes, labels and confidences.
pub struct YoloDetect {
    slot: ModelSlot,
    confidence_threshold: f64,
}

impl YoloDetect {
    /// Registry identifier of the tool.
    pub const IDENTIFIER: &'static str = "YoloDetect";

    /// Describes the tool's constructor arguments and output.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError`] if a parameter name is invalid.
    pub fn descriptor() -> Result<ToolDescriptor, CapabilityDomainError> {
        let mut descriptor = ToolDescriptor::new(
            ToolId::new(Self::IDENTIFIER)?,
            "Detect objects in images using YOLO model",
        );
        for parameter in model_parameters("YOLO", "yolo11n.pt")? {
            descriptor = descriptor.with_input(parameter);
        }
        Ok(descriptor
            .with_input(
                ToolParameter::new("conf_threshold", ParameterType::Number)?
                    .with_description("Minimum confidence for reported detections")
                    .with_default(Value::from(DEFAULT_CONFIDENCE)),
            )
            .with_output(
                ToolParameter::new("detections", ParameterType::Json)?
                    .with_description("Detected boxes with labels and confidences"),
            ))
    }

    /// Builds the tool from resolved constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidArgument`] when the confidence
    /// threshold lies outside `0.0..=1.0`.
    pub fn from_arguments(
        arguments: &ToolArguments,
        catalog: Arc<ModelCatalog>,
    ) -> CapabilityResult<Self> {
        let confidence_threshold = confidence(arguments)?.unwrap_or(DEFAULT_CONFIDENCE);
        Ok(Self {
            slot: ModelSlot::new(model_spec(arguments)?, catalog),
            confidence_threshold,
        })
    }
}

fn confidence(arguments: &ToolArguments) -> CapabilityResult<Option<f64>> {
    if !arguments.contains_key("conf_threshold") {
        return Ok(None);
    }
    let threshold = number_argument(arguments, "conf_threshold")?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(Some(threshold))
    } else {
        Err(CapabilityError::InvalidArgument {
            name: "conf_threshold".to_owned(),
            reason: format!("{threshold} is outside 0.0..=1.0"),
        })
    }
}

impl Capability for YoloDetect {
    fn setup(&mut self) -> CapabilityResult<()> {
        self.slot.load()
    }

    fn apply(&mut self, image: &ImageRef, arguments: &ToolArguments) -> CapabilityResult<Value> {
        ensure_image(image)?;
        let threshold = confidence(arguments)?.unwrap_or(self.confidence_threshold);
        debug!(%image, threshold, "running object detection");
        let request = PredictRequest::new().with_confidence_threshold(threshold);
        self.slot.model()?.predict(image, &request)
    }
}
