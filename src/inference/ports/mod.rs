//! Port contracts for text generation.

mod client;

pub use client::InferenceClient;
#[cfg(test)]
pub use client::MockInferenceClient;
