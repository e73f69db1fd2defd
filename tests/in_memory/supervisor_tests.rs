//! In-memory integration tests for inference server supervision.

use super::helpers::{SupervisorContext, context};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use vision_agent::server::{
    adapters::memory::{LaunchBehaviour, ScriptedHealthProbe},
    domain::{EntryPoint, InferenceServerConfig, ServerHealthStatus, ServerState},
    ports::ProcessError,
    services::SupervisorError,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_waits_for_health_and_returns_client(mut context: SupervisorContext) {
    let client = context.supervisor.start().await.expect("start succeeds");

    assert_eq!(client.base_url(), "http://127.0.0.1:8001");
    assert_eq!(context.supervisor.state(), ServerState::Healthy);
    assert_eq!(
        context.supervisor.base_url().as_deref(),
        Some("http://127.0.0.1:8001")
    );
    assert_eq!(context.probe.calls(), 3);
    assert_eq!(
        context.probe.urls().first().map(String::as_str),
        Some("http://127.0.0.1:8001/health")
    );
    assert_eq!(context.live(), 1);

    let handle = context.supervisor.handle().expect("session exists");
    assert_eq!(handle.entry_point(), EntryPoint::OpenAiCompatible);
    assert_eq!(handle.state(), ServerState::Healthy);
    assert_eq!(handle.last_health().status(), ServerHealthStatus::Healthy);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn launch_command_carries_model_and_address(mut context: SupervisorContext) {
    context.supervisor.start().await.expect("start succeeds");

    let launched = context.launcher.launched().expect("launch log");
    assert_eq!(launched.len(), 1);
    let command = launched[0].to_string();
    assert!(command.starts_with("python -m vllm.entrypoints.openai.api_server"));
    assert!(command.contains("--model /models/llava-7b"));
    assert!(command.contains("--port 8001"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_twice_is_a_no_op(mut context: SupervisorContext) {
    context.supervisor.start().await.expect("start succeeds");

    context.supervisor.stop().await.expect("first stop");
    context.supervisor.stop().await.expect("second stop");

    assert_eq!(context.supervisor.state(), ServerState::Stopped);
    assert!(context.supervisor.handle().is_none());
    assert!(context.supervisor.base_url().is_none());
    assert_eq!(context.live(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_a_fresh_supervisor_does_nothing(mut context: SupervisorContext) {
    context.supervisor.stop().await.expect("stop succeeds");

    assert_eq!(context.supervisor.state(), ServerState::Stopped);
    assert!(context.launcher.launched().expect("launch log").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restarting_keeps_a_single_live_process() {
    let mut context = SupervisorContext::with_probe(ScriptedHealthProbe::always_healthy());
    context.supervisor.start().await.expect("first start");
    let first_session = context
        .supervisor
        .handle()
        .expect("first session")
        .session_id();

    context.supervisor.start().await.expect("restart");

    assert_eq!(context.live(), 1);
    assert_eq!(context.launcher.launched().expect("launch log").len(), 2);
    let second_session = context
        .supervisor
        .handle()
        .expect("second session")
        .session_id();
    assert_ne!(first_session, second_session);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn silent_health_endpoint_times_out_without_leaking() {
    let mut context = SupervisorContext::with_probe(ScriptedHealthProbe::never_healthy());

    let err = context
        .supervisor
        .start()
        .await
        .expect_err("start must time out");

    assert!(matches!(err, SupervisorError::StartupTimeout { .. }));
    assert_eq!(
        context.entry_points(),
        vec![EntryPoint::OpenAiCompatible, EntryPoint::Legacy]
    );
    assert_eq!(context.supervisor.state(), ServerState::Failed);
    assert_eq!(context.live(), 0);
    let handle = context.supervisor.handle().expect("failed session kept");
    assert_eq!(handle.entry_point(), EntryPoint::Legacy);
    assert_eq!(handle.state(), ServerState::Failed);
    assert_eq!(handle.last_health().status(), ServerHealthStatus::Unhealthy);
    assert!(
        handle
            .last_health()
            .message()
            .is_some_and(|message| message.contains("connection refused"))
    );
    assert!(context.supervisor.base_url().is_none());

    context.supervisor.stop().await.expect("stop after failure");
    assert_eq!(context.supervisor.state(), ServerState::Stopped);
}

#[rstest]
#[case(LaunchBehaviour::FailToSpawn("vllm.entrypoints.openai missing".to_owned()))]
#[case(LaunchBehaviour::ExitImmediately(1))]
#[tokio::test(flavor = "multi_thread")]
async fn unusable_primary_entry_point_falls_back_to_legacy(
    mut context: SupervisorContext,
    #[case] behaviour: LaunchBehaviour,
) {
    context
        .launcher
        .set_behaviour(EntryPoint::OpenAiCompatible, behaviour)
        .expect("configure launcher");

    context.supervisor.start().await.expect("legacy start");

    let handle = context.supervisor.handle().expect("session exists");
    assert_eq!(handle.entry_point(), EntryPoint::Legacy);
    assert_eq!(context.supervisor.state(), ServerState::Healthy);
    assert_eq!(
        context.entry_points(),
        vec![EntryPoint::OpenAiCompatible, EntryPoint::Legacy]
    );
    assert_eq!(context.live(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn silent_primary_entry_point_falls_back_to_legacy() {
    let mut context = SupervisorContext::with_probe(ScriptedHealthProbe::never_healthy());
    let launcher = Arc::clone(&context.launcher);
    let probe = Arc::clone(&context.probe);
    let legacy_turns_healthy = tokio::spawn(async move {
        while launcher.launched().expect("launch log").len() < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        probe.set_healthy(true);
    });

    context.supervisor.start().await.expect("legacy start");
    legacy_turns_healthy.await.expect("health switch ran");

    assert_eq!(
        context.entry_points(),
        vec![EntryPoint::OpenAiCompatible, EntryPoint::Legacy]
    );
    assert_eq!(context.supervisor.state(), ServerState::Healthy);
    let handle = context.supervisor.handle().expect("session exists");
    assert_eq!(handle.entry_point(), EntryPoint::Legacy);
    assert_eq!(handle.last_health().status(), ServerHealthStatus::Healthy);
    assert_eq!(context.live(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreadable_exit_status_fails_the_start(mut context: SupervisorContext) {
    context
        .launcher
        .set_behaviour(
            EntryPoint::OpenAiCompatible,
            LaunchBehaviour::Unobservable("waitpid interrupted".to_owned()),
        )
        .expect("configure launcher");

    let err = context
        .supervisor
        .start()
        .await
        .expect_err("start must fail");

    assert!(matches!(
        err,
        SupervisorError::Process(ProcessError::Wait(ref message)) if message.contains("waitpid")
    ));
    assert_eq!(context.entry_points(), vec![EntryPoint::OpenAiCompatible]);
    assert_eq!(context.supervisor.state(), ServerState::Failed);
    assert_eq!(context.live(), 0);
    let handle = context.supervisor.handle().expect("failed session kept");
    assert_eq!(handle.state(), ServerState::Failed);
    assert_eq!(handle.last_health().status(), ServerHealthStatus::Unhealthy);

    context.supervisor.stop().await.expect("stop after failure");
    assert_eq!(context.supervisor.state(), ServerState::Stopped);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unrepresentable_startup_timeout_still_starts() {
    let config = InferenceServerConfig::from_lookup(|name| match name {
        "VISION_AGENT_MODEL_PATH" => Some("/models/llava-7b".to_owned()),
        "VISION_AGENT_STARTUP_TIMEOUT_SECS" => Some(u64::MAX.to_string()),
        "VISION_AGENT_PROBE_INTERVAL_MILLIS" => Some("5".to_owned()),
        _ => None,
    })
    .expect("environment parses");
    assert_eq!(config.startup_timeout(), Duration::from_secs(u64::MAX));
    let mut context =
        SupervisorContext::with_config(config, ScriptedHealthProbe::healthy_after(2));

    context.supervisor.start().await.expect("start succeeds");

    assert_eq!(context.supervisor.state(), ServerState::Healthy);
    assert_eq!(context.probe.calls(), 3);
    assert_eq!(context.live(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn both_entry_points_failing_reports_each_reason(mut context: SupervisorContext) {
    context
        .launcher
        .set_behaviour(
            EntryPoint::OpenAiCompatible,
            LaunchBehaviour::FailToSpawn("no openai server".to_owned()),
        )
        .expect("configure primary");
    context
        .launcher
        .set_behaviour(EntryPoint::Legacy, LaunchBehaviour::ExitImmediately(3))
        .expect("configure legacy");

    let err = context
        .supervisor
        .start()
        .await
        .expect_err("launch must fail");

    let SupervisorError::LaunchFailed { primary, legacy } = err else {
        panic!("expected launch failure, got {err:?}");
    };
    assert!(primary.contains("no openai server"));
    assert!(legacy.contains("exit status: 3"));
    assert_eq!(context.supervisor.state(), ServerState::Failed);
    assert_eq!(context.live(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_health_records_latest_probe(mut context: SupervisorContext) {
    context.supervisor.start().await.expect("start succeeds");
    context.probe.set_healthy(false);

    let snapshot = context
        .supervisor
        .refresh_health()
        .await
        .expect("refresh succeeds");

    assert_eq!(snapshot.status(), ServerHealthStatus::Unhealthy);
    let handle = context.supervisor.handle().expect("session exists");
    assert_eq!(handle.last_health().status(), ServerHealthStatus::Unhealthy);
    assert_eq!(context.supervisor.state(), ServerState::Healthy);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_health_requires_a_running_server(mut context: SupervisorContext) {
    let err = context
        .supervisor
        .refresh_health()
        .await
        .expect_err("nothing to probe");

    assert!(matches!(
        err,
        SupervisorError::NotRunning(ServerState::Stopped)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_health_fails_a_server_whose_process_exited(mut context: SupervisorContext) {
    context.supervisor.start().await.expect("start succeeds");
    context.launcher.exit_live(137).expect("crash the server");

    let snapshot = context
        .supervisor
        .refresh_health()
        .await
        .expect("refresh succeeds");

    assert_eq!(snapshot.status(), ServerHealthStatus::Unhealthy);
    assert!(
        snapshot
            .message()
            .is_some_and(|message| message.contains("exit status: 137"))
    );
    assert_eq!(context.supervisor.state(), ServerState::Failed);
    assert!(context.supervisor.base_url().is_none());
    assert_eq!(context.live(), 0);
    let handle = context.supervisor.handle().expect("session kept");
    assert_eq!(handle.state(), ServerState::Failed);
    assert_eq!(handle.last_health().status(), ServerHealthStatus::Unhealthy);
}
