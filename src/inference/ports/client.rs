//! Text generation port.

use crate::inference::domain::{ChatMessage, InferenceOptions, InferenceResult};
use async_trait::async_trait;

/// Generates text from a prompt or a conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Completes `prompt` and returns the trimmed generated text.
    async fn complete(&self, prompt: &str, options: &InferenceOptions) -> InferenceResult<String>;

    /// Answers the conversation and returns the trimmed generated text.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &InferenceOptions,
    ) -> InferenceResult<String>;
}
