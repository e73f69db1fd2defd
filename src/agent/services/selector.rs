//! Asks the language model which tool fits a request.

use crate::agent::domain::{SelectionRequest, SelectionResult, SelectorError};
use crate::inference::{domain::InferenceOptions, ports::InferenceClient};
use minijinja::Environment;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Prompt used unless [`ToolSelector::with_template`] replaces it.
///
/// The template sees `tools` (a list of `{name, description}`) and
/// `prompt`.
pub const DEFAULT_SELECTION_TEMPLATE: &str = "\
You are a vision agent assistant. Choose the vision tool that best fits the user's request.

Available tools:
{% for tool in tools %}- {{ tool.name }}: {{ tool.description }}
{% endfor %}
Reply with exactly one tool name and nothing else.
Example: YoloDetect

User request: {{ prompt }}";

/// Renders the selection prompt and returns the model's raw answer.
///
/// The answer is not checked against the registry; that is the
/// orchestrator's job.
#[derive(Debug, Clone)]
pub struct ToolSelector {
    template: String,
    options: InferenceOptions,
}

impl Default for ToolSelector {
    fn default() -> Self {
        Self {
            template: DEFAULT_SELECTION_TEMPLATE.to_owned(),
            options: InferenceOptions::default(),
        }
    }
}

impl ToolSelector {
    /// Creates a selector with the default template and options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the prompt template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Replaces the sampling options.
    #[must_use]
    pub fn with_options(mut self, options: InferenceOptions) -> Self {
        self.options = options;
        self
    }

    /// Renders the prompt sent to the model.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::TemplateRender`] when the template is
    /// malformed.
    pub fn build_prompt(&self, request: &SelectionRequest) -> Result<String, SelectorError> {
        let tools: Vec<Value> = request
            .tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.identifier().as_str(),
                    "description": tool.description(),
                })
            })
            .collect();
        let mut context = Map::new();
        context.insert("tools".to_owned(), Value::Array(tools));
        context.insert("prompt".to_owned(), Value::from(request.prompt()));

        Environment::new()
            .render_str(&self.template, context)
            .map_err(|err| SelectorError::TemplateRender(err.to_string()))
    }

    /// Asks `client` to pick a tool for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when rendering or inference fails.
    pub async fn select<I>(
        &self,
        client: &I,
        request: &SelectionRequest,
    ) -> Result<SelectionResult, SelectorError>
    where
        I: InferenceClient + ?Sized,
    {
        let prompt = self.build_prompt(request)?;
        let answer = client.complete(&prompt, &self.options).await?;
        let result = SelectionResult::from_raw(answer);
        debug!(raw = result.raw(), candidate = ?result.identifier(), "model proposed a tool");
        Ok(result)
    }
}
