//! Vision tool registry, capability instances, and tool discovery.
//!
//! Tools are registered as late-bound factories together with descriptive
//! metadata, so heavyweight model loading is deferred until a tool is first
//! invoked. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Registry, catalog, and search services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
