//! End-to-end requests through a supervised agent and a stub backend.

use super::helpers::fast_config;
use crate::test_helpers::{StubBackend, builtin_registry, image_file, modern_completion};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;
use vision_agent::{
    agent::{
        domain::{AgentError, ERROR_PREFIX},
        services::SupervisedVisionAgent,
    },
    capability::domain::{ImageRef, ToolArguments},
    server::{
        adapters::memory::{InMemoryProcessLauncher, ScriptedHealthProbe},
        domain::{InferenceServerConfig, ServerAddress, ServerState},
        services::SupervisorError,
    },
};

type TestAgent =
    SupervisedVisionAgent<InMemoryProcessLauncher, ScriptedHealthProbe, DefaultClock>;

fn config_for(stub: &StubBackend) -> InferenceServerConfig {
    fast_config()
        .expect("valid test configuration")
        .with_address(ServerAddress::new("127.0.0.1", stub.port()).expect("valid address"))
}

async fn launch(
    stub: &StubBackend,
    launcher: &Arc<InMemoryProcessLauncher>,
    probe: ScriptedHealthProbe,
) -> Result<TestAgent, AgentError> {
    SupervisedVisionAgent::launch(
        config_for(stub),
        builtin_registry(),
        Arc::clone(launcher),
        Arc::new(probe),
        Arc::new(DefaultClock),
    )
    .await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn model_choice_runs_segmentation_end_to_end() {
    let stub = StubBackend::start(|_path, _body| (200, modern_completion(" SegmentAnything\n")));
    let launcher = Arc::new(InMemoryProcessLauncher::new());
    let mut agent = launch(&stub, &launcher, ScriptedHealthProbe::always_healthy())
        .await
        .expect("launch succeeds");
    let image = image_file();

    let output = agent
        .agent()
        .process(
            "outline every region",
            &ImageRef::new(image.path()),
            &ToolArguments::new(),
        )
        .await;

    let parsed: Value = serde_json::from_str(&output).expect("tool output is JSON");
    assert_eq!(
        parsed["summary"],
        json!("Segmentation completed, detected 2 objects")
    );
    assert_eq!(stub.paths(), vec!["/v1/completions".to_owned()]);

    agent.shutdown().await.expect("shutdown succeeds");
    assert_eq!(agent.supervisor().state(), ServerState::Stopped);
    assert_eq!(launcher.live_count().expect("launcher state"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn garbage_answer_falls_back_to_detector() {
    let stub = StubBackend::start(|_path, _body| {
        (200, modern_completion("Hmm, maybe a detector of some kind?"))
    });
    let launcher = Arc::new(InMemoryProcessLauncher::new());
    let mut agent = launch(&stub, &launcher, ScriptedHealthProbe::always_healthy())
        .await
        .expect("launch succeeds");
    let image = image_file();

    let output = agent
        .agent()
        .process(
            "find objects in the picture",
            &ImageRef::new(image.path()),
            &ToolArguments::new(),
        )
        .await;

    let parsed: Value = serde_json::from_str(&output).expect("tool output is JSON");
    assert_eq!(parsed["detections"][0]["label"], json!("car"));

    agent.shutdown().await.expect("shutdown succeeds");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_image_is_reported_as_text() {
    let stub = StubBackend::start(|_path, _body| (200, modern_completion("YoloDetect")));
    let launcher = Arc::new(InMemoryProcessLauncher::new());
    let mut agent = launch(&stub, &launcher, ScriptedHealthProbe::always_healthy())
        .await
        .expect("launch succeeds");

    let output = agent
        .agent()
        .process(
            "detect cars",
            &ImageRef::new("/definitely/not/here.jpg"),
            &ToolArguments::new(),
        )
        .await;

    assert!(output.starts_with(ERROR_PREFIX), "got {output}");
    assert!(output.contains("image file not found"));

    agent.shutdown().await.expect("shutdown succeeds");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unhealthy_server_fails_launch() {
    let stub = StubBackend::start(|_path, _body| (200, modern_completion("YoloDetect")));
    let launcher = Arc::new(InMemoryProcessLauncher::new());

    let result = launch(&stub, &launcher, ScriptedHealthProbe::never_healthy()).await;

    assert!(matches!(
        result,
        Err(AgentError::Supervisor(SupervisorError::StartupTimeout { .. }))
    ));
    assert_eq!(launcher.live_count().expect("launcher state"), 0);
    assert!(stub.paths().is_empty());
}
