//! Text generation against an external inference backend.
//!
//! The [`ports::InferenceClient`] port hides which wire dialect the backend
//! speaks. The HTTP adapter prefers the OpenAI-compatible endpoints and falls
//! back to the legacy `/generate` endpoint, so older servers keep working.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
