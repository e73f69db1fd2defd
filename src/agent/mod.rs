//! Request orchestration: tool selection, validation and execution.
//!
//! A request flows through the [`services::ToolSelector`], is validated
//! against the capability registry, falls back to keyword ranking when the
//! model's answer is unusable, and finally runs the chosen tool. Failures
//! never escape [`services::VisionAgent::process`]; they come back as text
//! starting with [`domain::ERROR_PREFIX`].
//!
//! - Domain types in [`domain`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
