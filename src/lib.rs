//! Vision agent: LLM-driven tool selection over a pluggable vision toolbox.
//!
//! The crate receives a natural-language request plus an image, asks an
//! inference backend which registered vision tool fits the request, validates
//! the answer against the registry, and runs the chosen tool. When the model
//! answer is unusable the agent falls back to fuzzy search over tool
//! descriptions and finally to the first registered tool.
//!
//! # Architecture
//!
//! Each module follows hexagonal architecture principles:
//!
//! - **Domain**: value types and state machines with no infrastructure
//! - **Ports**: trait contracts for tools, inference backends, and processes
//! - **Adapters**: HTTP, OS process, and in-memory implementations of ports
//! - **Services**: registries, the server supervisor, and the orchestrator
//!
//! # Modules
//!
//! - [`capability`]: tool registry, lazy capability instances, fuzzy finder,
//!   model catalog, and built-in vision tools
//! - [`inference`]: inference client port with chat/completion dialect
//!   fallback
//! - [`server`]: inference-server lifecycle supervision and health probing
//! - [`agent`]: tool selection and the request orchestrator
//! - [`telemetry`]: tracing subscriber set-up for binaries

pub mod agent;
pub mod capability;
pub mod inference;
pub mod server;
pub mod telemetry;
