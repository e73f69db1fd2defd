//! Shared doubles for capability tests.

use crate::capability::{
    domain::{CapabilityError, CapabilityResult, ImageRef, ToolArguments, ToolDescriptor, ToolId},
    ports::{
        Capability, CapabilityFactory, ModelLoader, PredictRequest, VisionModel,
        capability_factory, model_loader,
    },
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Capability that echoes its label and the image path.
pub struct EchoCapability {
    pub label: &'static str,
}

impl Capability for EchoCapability {
    fn apply(&mut self, image: &ImageRef, _arguments: &ToolArguments) -> CapabilityResult<Value> {
        Ok(json!({ "tool": self.label, "image": image.to_string() }))
    }
}

pub fn echo_factory(label: &'static str) -> Arc<dyn CapabilityFactory> {
    capability_factory(move |_arguments: &ToolArguments| {
        Ok(Box::new(EchoCapability { label }) as Box<dyn Capability>)
    })
}

pub fn descriptor(identifier: &str, description: &str) -> ToolDescriptor {
    ToolDescriptor::new(
        ToolId::new(identifier).expect("valid tool identifier"),
        description,
    )
}

/// Model double that records every request it receives.
pub struct RecordingModel {
    pub output: Value,
    pub requests: Arc<Mutex<Vec<PredictRequest>>>,
}

impl VisionModel for RecordingModel {
    fn predict(&mut self, _image: &ImageRef, request: &PredictRequest) -> CapabilityResult<Value> {
        self.requests
            .lock()
            .expect("request log lock")
            .push(request.clone());
        Ok(self.output.clone())
    }
}

pub fn recording_loader(
    output: Value,
    requests: Arc<Mutex<Vec<PredictRequest>>>,
) -> Arc<dyn ModelLoader> {
    model_loader(move |_spec: &crate::capability::ports::ModelSpec| {
        Ok(Box::new(RecordingModel {
            output: output.clone(),
            requests: Arc::clone(&requests),
        }) as Box<dyn VisionModel>)
    })
}

pub fn failing_loader(message: &'static str) -> Arc<dyn ModelLoader> {
    model_loader(move |_spec: &crate::capability::ports::ModelSpec| {
        Err(CapabilityError::SetupFailed(message.to_owned()))
    })
}
