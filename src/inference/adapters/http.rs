//! HTTP client for vLLM-style inference servers.

use crate::inference::{
    domain::{
        ChatMessage, InferenceError, InferenceOptions, InferenceResult, WireDialect,
        flatten_messages,
    },
    ports::InferenceClient,
};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const CHAT_PATH: &str = "/v1/chat/completions";

/// Inference client speaking the OpenAI-compatible and legacy dialects.
///
/// Completions try the modern dialect first and fall back to the legacy
/// `/generate` endpoint on any failure. Requests carry no timeout unless
/// one is set with [`HttpInferenceClient::with_timeout`].
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpInferenceClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Client`] when the HTTP stack cannot be
    /// initialised.
    pub fn new(base_url: impl Into<String>) -> InferenceResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| InferenceError::Client(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: None,
        })
    }

    /// Bounds every request by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the server base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, body: &Value) -> InferenceResult<Value> {
        let endpoint = format!("{}{path}", self.base_url);
        let mut request = self.http.post(&endpoint).json(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|err| InferenceError::Transport {
                endpoint: endpoint.clone(),
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| InferenceError::Schema {
                endpoint,
                reason: err.to_string(),
            })
    }

    async fn post_for_text(&self, path: &str, body: &Value, pointer: &str) -> InferenceResult<String> {
        let response = self.post(path, body).await?;
        response
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(|text| text.trim().to_owned())
            .ok_or_else(|| InferenceError::Schema {
                endpoint: format!("{}{path}", self.base_url),
                reason: format!("missing string at {pointer}"),
            })
    }

    async fn complete_with(
        &self,
        dialect: WireDialect,
        prompt: &str,
        options: &InferenceOptions,
    ) -> InferenceResult<String> {
        let body = completion_body(dialect, prompt, options);
        let pointer = match dialect {
            WireDialect::Modern => "/choices/0/text",
            WireDialect::Legacy => "/text/0",
        };
        self.post_for_text(dialect.completion_path(), &body, pointer)
            .await
    }
}

fn completion_body(dialect: WireDialect, prompt: &str, options: &InferenceOptions) -> Value {
    let mut body = Map::new();
    if dialect == WireDialect::Modern {
        body.insert("model".to_owned(), Value::from(options.model()));
    }
    body.insert("prompt".to_owned(), Value::from(prompt));
    body.insert("temperature".to_owned(), json!(options.temperature()));
    body.insert("top_p".to_owned(), json!(options.top_p()));
    body.insert("max_tokens".to_owned(), Value::from(options.max_tokens()));
    if dialect == WireDialect::Modern {
        body.insert("stream".to_owned(), Value::Bool(false));
    }
    options.merge_extra_into(&mut body);
    Value::Object(body)
}

fn chat_body(messages: &[ChatMessage], options: &InferenceOptions) -> Value {
    let mut body = Map::new();
    body.insert("model".to_owned(), Value::from(options.model()));
    body.insert("messages".to_owned(), json!(messages));
    body.insert("temperature".to_owned(), json!(options.temperature()));
    body.insert("top_p".to_owned(), json!(options.top_p()));
    body.insert("max_tokens".to_owned(), Value::from(options.max_tokens()));
    body.insert("stream".to_owned(), Value::Bool(false));
    options.merge_extra_into(&mut body);
    Value::Object(body)
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn complete(&self, prompt: &str, options: &InferenceOptions) -> InferenceResult<String> {
        let modern = match self.complete_with(WireDialect::Modern, prompt, options).await {
            Ok(text) => return Ok(text),
            Err(err) => err,
        };
        warn!(
            base_url = %self.base_url,
            error = %modern,
            "modern completion endpoint failed; trying legacy dialect"
        );

        self.complete_with(WireDialect::Legacy, prompt, options)
            .await
            .map_err(|legacy| InferenceError::BackendUnavailable {
                modern: modern.to_string(),
                legacy: legacy.to_string(),
            })
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &InferenceOptions,
    ) -> InferenceResult<String> {
        let body = chat_body(messages, options);
        match self
            .post_for_text(CHAT_PATH, &body, "/choices/0/message/content")
            .await
        {
            Ok(text) => Ok(text),
            Err(err) => {
                debug!(
                    base_url = %self.base_url,
                    error = %err,
                    "chat endpoint failed; flattening conversation into a completion"
                );
                self.complete(&flatten_messages(messages), options).await
            }
        }
    }
}
