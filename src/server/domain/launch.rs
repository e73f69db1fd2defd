//! Server entry points and the commands that start them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Python module used to start the inference server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// The OpenAI-compatible API server.
    OpenAiCompatible,
    /// The older plain API server.
    Legacy,
}

impl EntryPoint {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "openai_compatible",
            Self::Legacy => "legacy",
        }
    }

    /// Returns the Python module run with `-m`.
    #[must_use]
    pub const fn module(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "vllm.entrypoints.openai.api_server",
            Self::Legacy => "vllm.entrypoints.api_server",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fully rendered process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchCommand {
    entry_point: EntryPoint,
    program: String,
    args: Vec<String>,
}

impl LaunchCommand {
    /// Creates a launch command.
    #[must_use]
    pub fn new(
        entry_point: EntryPoint,
        program: impl Into<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            entry_point,
            program: program.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Returns the entry point the command starts.
    #[must_use]
    pub const fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    /// Returns the executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.program)?;
        for arg in &self.args {
            write!(formatter, " {arg}")?;
        }
        Ok(())
    }
}
