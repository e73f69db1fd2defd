//! Adapter implementations of the inference port.

mod http;
mod scripted;

pub use http::HttpInferenceClient;
pub use scripted::ScriptedInferenceClient;
