//! Scripted inference client for tests and offline demos.

use crate::inference::{
    domain::{ChatMessage, InferenceError, InferenceOptions, InferenceResult, flatten_messages},
    ports::InferenceClient,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Replays queued responses in order and records every prompt it sees.
///
/// Chat requests are flattened with [`flatten_messages`] before being
/// recorded. Once the queue is empty every call fails with
/// [`InferenceError::NoScriptedResponse`].
#[derive(Debug, Default)]
pub struct ScriptedInferenceClient {
    responses: Mutex<VecDeque<InferenceResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInferenceClient {
    /// Creates a client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful completion.
    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queues a failure.
    #[must_use]
    pub fn with_error(self, error: InferenceError) -> Self {
        self.push(Err(error));
        self
    }

    /// Appends a response to the script.
    pub fn push(&self, response: InferenceResult<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Returns the prompts received so far, oldest first.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next(&self, prompt: String) -> InferenceResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(InferenceError::NoScriptedResponse))
            .map(|text| text.trim().to_owned())
    }
}

#[async_trait]
impl InferenceClient for ScriptedInferenceClient {
    async fn complete(&self, prompt: &str, _options: &InferenceOptions) -> InferenceResult<String> {
        self.next(prompt.to_owned())
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _options: &InferenceOptions,
    ) -> InferenceResult<String> {
        self.next(flatten_messages(messages))
    }
}
