//! Selection request, raw model answer and resolved choice.

use crate::capability::domain::{ToolDescriptor, ToolId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input to the tool selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRequest {
    prompt: String,
    tools: Vec<ToolDescriptor>,
}

impl SelectionRequest {
    /// Creates a request for `prompt` over `tools`.
    #[must_use]
    pub fn new(prompt: impl Into<String>, tools: Vec<ToolDescriptor>) -> Self {
        Self {
            prompt: prompt.into(),
            tools,
        }
    }

    /// Returns the user's request.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the candidate tools in registration order.
    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }
}

/// What the model answered, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    raw: String,
    identifier: Option<String>,
}

impl SelectionResult {
    /// Wraps the model's answer and derives the candidate identifier.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let trimmed = raw.into().trim().to_owned();
        let identifier = normalize_selection(&trimmed);
        Self {
            raw: trimmed,
            identifier,
        }
    }

    /// Returns the trimmed model output.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the candidate identifier, if the output had any text.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

/// Extracts a candidate tool name from free-form model output.
///
/// Takes the first non-empty line and strips whitespace, quotes and
/// backticks around it.
#[must_use]
pub fn normalize_selection(raw: &str) -> Option<String> {
    raw.lines()
        .map(|line| line.trim().trim_matches(['"', '\'', '`']).trim())
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

/// How the orchestrator arrived at a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// The model named a registered tool exactly.
    Model,
    /// Keyword ranking over tool descriptions.
    FuzzySearch,
    /// The first registered tool.
    Default,
}

impl SelectionSource {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::FuzzySearch => "fuzzy_search",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// The tool the orchestrator will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSelection {
    tool: ToolId,
    source: SelectionSource,
    raw: String,
}

impl ToolSelection {
    /// Creates a selection.
    #[must_use]
    pub fn new(tool: ToolId, source: SelectionSource, raw: impl Into<String>) -> Self {
        Self {
            tool,
            source,
            raw: raw.into(),
        }
    }

    /// Returns the chosen tool.
    #[must_use]
    pub const fn tool(&self) -> &ToolId {
        &self.tool
    }

    /// Returns how the tool was chosen.
    #[must_use]
    pub const fn source(&self) -> SelectionSource {
        self.source
    }

    /// Returns the selector's raw answer.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}
