//! Fuzzy ranking of registered tools against free-text queries.

use crate::capability::{
    domain::ToolId,
    services::{CapabilityRegistry, CapabilityRegistryResult},
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Tokens shorter than this carry too little signal to match on.
const MIN_TOKEN_LENGTH: usize = 3;
/// Minimum shared prefix for two different tokens to count as one stem.
const MIN_STEM_LENGTH: usize = 4;
const EXACT_TOKEN_SCORE: u32 = 3;
const STEM_TOKEN_SCORE: u32 = 2;
const IDENTIFIER_MENTION_SCORE: u32 = 5;

/// Ranks registered tools by how well their descriptions match a query.
///
/// When nothing scores above zero the finder falls back to registration
/// order, so a non-empty registry always yields at least one candidate.
#[derive(Clone)]
pub struct FuzzyFinder {
    registry: Arc<CapabilityRegistry>,
}

impl FuzzyFinder {
    /// Creates a finder over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Returns up to `top_k` identifiers ordered by descending relevance.
    ///
    /// Ties keep registration order.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the catalogue cannot be read.
    pub fn search(&self, query: &str, top_k: usize) -> CapabilityRegistryResult<Vec<ToolId>> {
        let candidates = self.registry.list_with_descriptions()?;
        let mut scored: Vec<(u32, ToolId)> = candidates
            .into_iter()
            .map(|(identifier, description)| {
                (relevance_score(query, identifier.as_str(), &description), identifier)
            })
            .collect();

        if scored.iter().all(|(score, _)| *score == 0) {
            debug!(query, "no tool description matched query; using registration order");
            return Ok(scored
                .into_iter()
                .take(top_k)
                .map(|(_, identifier)| identifier)
                .collect());
        }

        scored.sort_by(|left, right| right.0.cmp(&left.0));
        Ok(scored
            .into_iter()
            .filter(|(score, _)| *score > 0)
            .take(top_k)
            .map(|(_, identifier)| identifier)
            .collect())
    }
}

/// Scores how well `query` matches a tool's identifier and description.
///
/// Exact token matches outrank shared stems such as `detect` and
/// `detection`. Naming the tool identifier in the query adds a bonus.
#[must_use]
pub fn relevance_score(query: &str, identifier: &str, description: &str) -> u32 {
    let query_tokens = tokenize(query);
    let description_tokens = tokenize(description);

    let token_score: u32 = query_tokens
        .iter()
        .map(|token| {
            if description_tokens.contains(token) {
                EXACT_TOKEN_SCORE
            } else if description_tokens
                .iter()
                .any(|candidate| shares_stem(token, candidate))
            {
                STEM_TOKEN_SCORE
            } else {
                0
            }
        })
        .sum();

    let mentions_identifier = query
        .to_lowercase()
        .contains(&identifier.to_lowercase());
    if mentions_identifier {
        token_score.saturating_add(IDENTIFIER_MENTION_SCORE)
    } else {
        token_score
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|character: char| !character.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_LENGTH)
        .map(str::to_lowercase)
        .collect()
}

fn shares_stem(left: &str, right: &str) -> bool {
    let common = left
        .chars()
        .zip(right.chars())
        .take_while(|(a, b)| a == b)
        .count();
    common >= MIN_STEM_LENGTH
}
