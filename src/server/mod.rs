//! Supervision of the external inference server process.
//!
//! The supervisor launches the server, waits for its health endpoint,
//! falls back to the legacy entry point when the primary one cannot run,
//! and tears the process down gracefully. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
