//! Runs one vision request against a locally supervised inference server.
//!
//! Usage:
//!
//! ```text
//! vision_agent <image-path> <request...>
//! ```
//!
//! The server is configured from `VISION_AGENT_*` environment variables
//! (at minimum `VISION_AGENT_MODEL_PATH`). The tool result, or an error line
//! starting with `[vision-agent error]`, is written to standard output.
//! No model loaders are registered here, so built-in tools report which
//! models are missing; embedders register loaders on the [`ModelCatalog`].

use mockable::DefaultClock;
use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use vision_agent::{
    agent::{domain::AgentError, services::SupervisedVisionAgent},
    capability::{
        adapters::register_builtin_tools,
        domain::{ImageRef, ToolArguments},
        services::{CapabilityRegistry, CapabilityRegistryError, ModelCatalog},
    },
    server::{
        adapters::{HttpHealthProbe, TokioProcessLauncher},
        domain::{ConfigurationError, InferenceServerConfig},
        ports::HealthProbeError,
    },
    telemetry::{TelemetryError, init_tracing},
};

#[derive(Debug, Error)]
enum RunnerError {
    #[error("usage: vision_agent <image-path> <request...>")]
    Usage,
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Registry(#[from] CapabilityRegistryError),
    #[error(transparent)]
    Probe(#[from] HealthProbeError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("failed to write result: {0}")]
    Output(#[from] io::Error),
}

struct Request {
    image: ImageRef,
    prompt: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Request, RunnerError> {
    let _program = args.next();
    let image = args.next().map(ImageRef::new).ok_or(RunnerError::Usage)?;
    let prompt = args.collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        return Err(RunnerError::Usage);
    }
    Ok(Request { image, prompt })
}

async fn run(request: Request) -> Result<(), RunnerError> {
    let config = InferenceServerConfig::from_env()?;
    let registry = Arc::new(CapabilityRegistry::new());
    let catalog = Arc::new(ModelCatalog::new());
    register_builtin_tools(&registry, &catalog)?;

    let mut supervised = SupervisedVisionAgent::launch(
        config,
        registry,
        Arc::new(TokioProcessLauncher::new()),
        Arc::new(HttpHealthProbe::new()?),
        Arc::new(DefaultClock),
    )
    .await?;

    let output = supervised
        .agent()
        .process(&request.prompt, &request.image, &ToolArguments::new())
        .await;
    let written = writeln!(io::stdout().lock(), "{output}");
    supervised.shutdown().await?;
    written.map_err(RunnerError::from)
}

async fn start() -> Result<(), RunnerError> {
    init_tracing()?;
    let request = parse_args(env::args())?;
    run(request).await
}

#[tokio::main]
async fn main() -> ExitCode {
    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "vision agent run failed");
            if matches!(err, RunnerError::Usage) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
