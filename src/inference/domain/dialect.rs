//! Wire dialects spoken by inference backends.

use std::fmt;

/// HTTP dialect used for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireDialect {
    /// OpenAI-compatible `/v1/completions` and `/v1/chat/completions`.
    Modern,
    /// The older `/generate` endpoint.
    Legacy,
}

impl WireDialect {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Legacy => "legacy",
        }
    }

    /// Returns the completion endpoint path for the dialect.
    #[must_use]
    pub const fn completion_path(self) -> &'static str {
        match self {
            Self::Modern => "/v1/completions",
            Self::Legacy => "/generate",
        }
    }
}

impl fmt::Display for WireDialect {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
