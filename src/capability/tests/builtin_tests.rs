//! Built-in tools resolved through the model catalogue.

use super::support::{failing_loader, recording_loader};
use crate::capability::{
    adapters::register_builtin_tools,
    domain::{CapabilityError, ImageRef, InstanceState, ToolArguments},
    ports::PredictRequest,
    services::{CapabilityRegistry, CapabilityRegistryError, ModelCatalog},
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

struct Harness {
    registry: CapabilityRegistry,
    catalog: Arc<ModelCatalog>,
    requests: Arc<Mutex<Vec<PredictRequest>>>,
    image: NamedTempFile,
}

impl Harness {
    fn image(&self) -> ImageRef {
        ImageRef::new(self.image.path())
    }

    fn recorded(&self) -> Vec<PredictRequest> {
        self.requests.lock().expect("request log lock").clone()
    }
}

#[fixture]
fn harness() -> Harness {
    let catalog = Arc::new(ModelCatalog::new());
    let requests = Arc::new(Mutex::new(Vec::new()));
    catalog
        .register(
            "YOLO",
            recording_loader(json!({ "detections": [] }), Arc::clone(&requests)),
        )
        .expect("register detector model");
    catalog
        .register(
            "SAM-ViT-H",
            recording_loader(
                json!({ "masks": [[0, 1], [1, 0], [1, 1]] }),
                Arc::clone(&requests),
            ),
        )
        .expect("register segmenter model");

    let registry = CapabilityRegistry::new();
    register_builtin_tools(&registry, &catalog).expect("register built-in tools");

    let mut image = NamedTempFile::new().expect("create image file");
    image.write_all(b"not really a jpeg").expect("write image file");

    Harness {
        registry,
        catalog,
        requests,
        image,
    }
}

#[rstest]
fn builtin_tools_register_in_order(harness: Harness) {
    let ids = harness.registry.list().expect("list tools");

    assert_eq!(ids, vec!["YoloDetect", "SegmentAnything", "SegmentObject"]);
}

#[rstest]
fn detector_uses_default_confidence(harness: Harness) {
    let mut tool = harness
        .registry
        .instantiate("YoloDetect", &ToolArguments::new())
        .expect("instantiate detector");

    let output = tool
        .invoke(&harness.image(), &ToolArguments::new())
        .expect("detection succeeds");

    assert_eq!(output, json!({ "detections": [] }));
    assert_eq!(tool.state(), InstanceState::Ready);
    let recorded = harness.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(json!(recorded[0].confidence_threshold()), json!(0.5));
}

#[rstest]
fn per_call_confidence_overrides_constructor_value(harness: Harness) {
    let constructor = ToolArguments::from([("conf_threshold".to_owned(), json!(0.3))]);
    let call = ToolArguments::from([("conf_threshold".to_owned(), json!(0.9))]);
    let mut tool = harness
        .registry
        .instantiate("YoloDetect", &constructor)
        .expect("instantiate detector");

    tool.invoke(&harness.image(), &call).expect("detection succeeds");

    assert_eq!(
        json!(harness.recorded()[0].confidence_threshold()),
        json!(0.9)
    );
}

#[rstest]
#[case(json!(1.5))]
#[case(json!("high"))]
fn invalid_confidence_is_rejected(harness: Harness, #[case] threshold: Value) {
    let arguments = ToolArguments::from([("conf_threshold".to_owned(), threshold)]);

    let result = harness.registry.instantiate("YoloDetect", &arguments);

    assert!(matches!(
        result,
        Err(CapabilityRegistryError::Factory(CapabilityError::InvalidArgument { .. }))
    ));
}

#[rstest]
fn segmentation_reports_mask_count(harness: Harness) {
    let mut tool = harness
        .registry
        .instantiate("SegmentAnything", &ToolArguments::new())
        .expect("instantiate segmenter");

    let output = tool
        .invoke(&harness.image(), &ToolArguments::new())
        .expect("segmentation succeeds");

    assert_eq!(
        output["summary"],
        "Segmentation completed, detected 3 objects"
    );
}

#[rstest]
fn object_segmentation_forwards_prompt(harness: Harness) {
    let constructor = ToolArguments::from([("prompt".to_owned(), json!("bicycle"))]);
    let mut tool = harness
        .registry
        .instantiate("SegmentObject", &constructor)
        .expect("instantiate object segmenter");

    tool.invoke(&harness.image(), &ToolArguments::new())
        .expect("segmentation succeeds");

    assert_eq!(harness.recorded()[0].prompt(), Some("bicycle"));
}

#[rstest]
fn missing_image_is_reported_before_prediction(harness: Harness) {
    let mut tool = harness
        .registry
        .instantiate("YoloDetect", &ToolArguments::new())
        .expect("instantiate detector");

    let result = tool.invoke(&ImageRef::new("/nonexistent/street.jpg"), &ToolArguments::new());

    assert!(matches!(result, Err(CapabilityError::ImageNotFound(ref path)) if path.contains("street.jpg")));
    assert!(harness.recorded().is_empty());
}

#[rstest]
fn unknown_model_lists_catalogue(harness: Harness) {
    let arguments = ToolArguments::from([("model_name".to_owned(), json!("DETR"))]);
    let mut tool = harness
        .registry
        .instantiate("YoloDetect", &arguments)
        .expect("construction defers model loading");

    let result = tool.ensure_ready();

    assert!(matches!(
        result,
        Err(CapabilityError::ModelNotFound { ref name, ref available })
            if name == "DETR" && available == "YOLO, SAM-ViT-H"
    ));
    assert_eq!(tool.state(), InstanceState::Unconfigured);
}

#[rstest]
fn loader_failures_surface_as_setup_errors(harness: Harness) {
    harness
        .catalog
        .register("YOLO", failing_loader("checkpoint corrupt"))
        .expect("replace detector model");
    let mut tool = harness
        .registry
        .instantiate("YoloDetect", &ToolArguments::new())
        .expect("instantiate detector");

    let result = tool.invoke(&harness.image(), &ToolArguments::new());

    assert!(matches!(
        result,
        Err(CapabilityError::SetupFailed(ref message)) if message.contains("checkpoint corrupt")
    ));
}
