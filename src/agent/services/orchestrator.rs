//! Per-request orchestration: select, validate, fall back, execute.

use super::ToolSelector;
use crate::agent::domain::{
    AgentError, AgentResult, ERROR_PREFIX, SelectionRequest, SelectionSource, ToolSelection,
    normalize_selection,
};
use crate::capability::{
    domain::{ImageRef, ToolArguments},
    services::{CapabilityRegistry, CapabilityRegistryError, FuzzyFinder},
};
use crate::inference::ports::InferenceClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Turns a natural-language request and an image into a tool result.
///
/// The model's choice is only trusted when it names a registered tool
/// exactly. Otherwise the request is ranked against tool descriptions, and
/// as a last resort the first registered tool runs.
pub struct VisionAgent<I>
where
    I: InferenceClient + ?Sized,
{
    registry: Arc<CapabilityRegistry>,
    finder: FuzzyFinder,
    selector: ToolSelector,
    client: Arc<I>,
}

impl<I> VisionAgent<I>
where
    I: InferenceClient + ?Sized,
{
    /// Creates an agent over `registry` that asks `client` for choices.
    #[must_use]
    pub fn new(registry: Arc<CapabilityRegistry>, client: Arc<I>) -> Self {
        Self {
            finder: FuzzyFinder::new(Arc::clone(&registry)),
            registry,
            selector: ToolSelector::new(),
            client,
        }
    }

    /// Replaces the tool selector.
    #[must_use]
    pub fn with_selector(mut self, selector: ToolSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Returns the registry the agent dispatches to.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Handles one request end to end.
    ///
    /// Errors are rendered as text beginning with [`ERROR_PREFIX`].
    pub async fn process(
        &self,
        prompt: &str,
        image: &ImageRef,
        arguments: &ToolArguments,
    ) -> String {
        self.try_process(prompt, image, arguments)
            .await
            .unwrap_or_else(|err| render_error(&err))
    }

    /// Handles one request, returning errors instead of rendering them.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when selection or execution fails.
    pub async fn try_process(
        &self,
        prompt: &str,
        image: &ImageRef,
        arguments: &ToolArguments,
    ) -> AgentResult<String> {
        let selection = self.select_tool(prompt).await?;
        info!(
            tool = %selection.tool(),
            source = %selection.source(),
            raw = selection.raw(),
            "selected tool"
        );
        self.execute(selection.tool().as_str(), image, arguments)
    }

    /// Asks the model for a tool and resolves its answer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Selector`] when the model cannot be asked and
    /// [`AgentError::NoToolsRegistered`] for an empty registry.
    pub async fn select_tool(&self, prompt: &str) -> AgentResult<ToolSelection> {
        let descriptors = self.registry.descriptors()?;
        if descriptors.is_empty() {
            return Err(AgentError::NoToolsRegistered);
        }
        let request = SelectionRequest::new(prompt, descriptors);
        let result = self.selector.select(&*self.client, &request).await?;
        self.resolve_tool(prompt, result.raw())
    }

    /// Maps the selector's answer to a registered tool.
    ///
    /// An exact, case-sensitive match wins. Otherwise the prompt is ranked
    /// against tool descriptions, and the first registered tool is the
    /// final fallback.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoToolsRegistered`] for an empty registry.
    pub fn resolve_tool(&self, prompt: &str, selector_text: &str) -> AgentResult<ToolSelection> {
        let registered = self.registry.list()?;

        if let Some(candidate) = normalize_selection(selector_text)
            && let Some(tool) = registered.iter().find(|tool| **tool == candidate.as_str())
        {
            return Ok(ToolSelection::new(
                tool.clone(),
                SelectionSource::Model,
                selector_text,
            ));
        }

        warn!(
            selector_text,
            "selector did not name a registered tool; ranking by description"
        );
        let ranked = self
            .finder
            .search(prompt, 1)
            .inspect_err(|err| warn!(error = %err, "fuzzy tool search failed"))
            .ok()
            .and_then(|found| found.into_iter().next());
        if let Some(tool) = ranked {
            return Ok(ToolSelection::new(
                tool,
                SelectionSource::FuzzySearch,
                selector_text,
            ));
        }

        let first = registered
            .into_iter()
            .next()
            .ok_or(AgentError::NoToolsRegistered)?;
        Ok(ToolSelection::new(first, SelectionSource::Default, selector_text))
    }

    /// Runs `identifier` without consulting the model.
    ///
    /// Errors are rendered as text beginning with [`ERROR_PREFIX`].
    #[must_use]
    pub fn direct_tool_call(
        &self,
        identifier: &str,
        image: &ImageRef,
        arguments: &ToolArguments,
    ) -> String {
        self.execute(identifier, image, arguments)
            .unwrap_or_else(|err| render_error(&err))
    }

    /// Instantiates `identifier` and applies it once to `image`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Registry`] for unknown tools and
    /// [`AgentError::CapabilityFailure`] when the tool cannot be built or
    /// fails while running.
    pub fn execute(
        &self,
        identifier: &str,
        image: &ImageRef,
        arguments: &ToolArguments,
    ) -> AgentResult<String> {
        let mut instance = self
            .registry
            .instantiate(identifier, arguments)
            .map_err(|err| match err {
                CapabilityRegistryError::Factory(source) => AgentError::CapabilityFailure {
                    tool: identifier.to_owned(),
                    source,
                },
                other => AgentError::Registry(other),
            })?;
        let output = instance
            .invoke(image, arguments)
            .map_err(|source| AgentError::CapabilityFailure {
                tool: identifier.to_owned(),
                source,
            })?;
        Ok(render_output(output))
    }
}

fn render_output(output: Value) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn render_error(err: &AgentError) -> String {
    warn!(error = %err, "vision agent request failed");
    format!("{ERROR_PREFIX} {err}")
}
