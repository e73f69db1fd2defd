//! Sampling options shared by every inference request.

use serde_json::{Map, Value};

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_TOP_P: f64 = 0.9;
const DEFAULT_MAX_TOKENS: u32 = 512;

/// Generation parameters sent with each request.
///
/// `extra` entries are forwarded verbatim. They never override the
/// standard fields.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOptions {
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
    model: String,
    extra: Map<String, Value>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
            model: String::new(),
            extra: Map::new(),
        }
    }
}

impl InferenceOptions {
    /// Creates options with the default sampling parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the nucleus sampling mass.
    #[must_use]
    pub const fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the completion length limit.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the served model name sent to OpenAI-compatible endpoints.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Adds a backend-specific field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns the sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Returns the nucleus sampling mass.
    #[must_use]
    pub const fn top_p(&self) -> f64 {
        self.top_p
    }

    /// Returns the completion length limit.
    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Returns the served model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns backend-specific fields.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Copies `extra` into `body` without replacing existing keys.
    pub fn merge_extra_into(&self, body: &mut Map<String, Value>) {
        for (key, value) in &self.extra {
            body.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}
