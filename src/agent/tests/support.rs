//! Registry doubles shaped like the built-in vision tools.

use crate::capability::{
    adapters::builtin::{SegmentAnything, SegmentObject, YoloDetect},
    domain::{CapabilityError, CapabilityResult, ImageRef, ToolArguments, ToolDescriptor},
    ports::{Capability, capability_factory},
    services::CapabilityRegistry,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Reports which tool ran on which image.
struct Labelled(&'static str);

impl Capability for Labelled {
    fn apply(&mut self, image: &ImageRef, _arguments: &ToolArguments) -> CapabilityResult<Value> {
        Ok(json!({ "tool": self.0, "image": image.to_string() }))
    }
}

/// Fails every invocation.
struct Broken;

impl Capability for Broken {
    fn apply(&mut self, _image: &ImageRef, _arguments: &ToolArguments) -> CapabilityResult<Value> {
        Err(CapabilityError::ApplyFailed("model crashed".to_owned()))
    }
}

/// Returns a plain string so rendering can be checked.
struct Caption;

impl Capability for Caption {
    fn apply(&mut self, _image: &ImageRef, _arguments: &ToolArguments) -> CapabilityResult<Value> {
        Ok(Value::String("a cat on a sofa".to_owned()))
    }
}

fn labelled(registry: &CapabilityRegistry, identifier: &'static str, descriptor: ToolDescriptor) {
    registry
        .register(
            identifier,
            capability_factory(move |_arguments: &ToolArguments| {
                Ok(Box::new(Labelled(identifier)) as Box<dyn Capability>)
            }),
            descriptor,
        )
        .expect("register tool");
}

/// Registry holding cheap stand-ins for the three built-in tools, in
/// built-in registration order.
pub fn vision_registry() -> Arc<CapabilityRegistry> {
    let registry = CapabilityRegistry::new();
    labelled(
        &registry,
        YoloDetect::IDENTIFIER,
        YoloDetect::descriptor().expect("detection descriptor"),
    );
    labelled(
        &registry,
        SegmentAnything::IDENTIFIER,
        SegmentAnything::descriptor().expect("segmentation descriptor"),
    );
    labelled(
        &registry,
        SegmentObject::IDENTIFIER,
        SegmentObject::descriptor().expect("object segmentation descriptor"),
    );
    Arc::new(registry)
}

pub fn register_broken(registry: &CapabilityRegistry) {
    registry
        .register(
            "Broken",
            capability_factory(|_arguments: &ToolArguments| {
                Ok(Box::new(Broken) as Box<dyn Capability>)
            }),
            YoloDetect::descriptor().expect("descriptor"),
        )
        .expect("register broken tool");
}

pub fn register_caption(registry: &CapabilityRegistry) {
    registry
        .register(
            "Caption",
            capability_factory(|_arguments: &ToolArguments| {
                Ok(Box::new(Caption) as Box<dyn Capability>)
            }),
            YoloDetect::descriptor().expect("descriptor"),
        )
        .expect("register caption tool");
}

/// Registers a tool whose factory insists on a `label` argument.
pub fn register_needs_label(registry: &CapabilityRegistry) {
    registry
        .register(
            "Labeller",
            capability_factory(|arguments: &ToolArguments| {
                if arguments.contains_key("label") {
                    Ok(Box::new(Labelled("Labeller")) as Box<dyn Capability>)
                } else {
                    Err(CapabilityError::MissingArgument("label".to_owned()))
                }
            }),
            YoloDetect::descriptor().expect("descriptor"),
        )
        .expect("register labeller");
}

pub fn image() -> ImageRef {
    ImageRef::new("/data/street.jpg")
}
