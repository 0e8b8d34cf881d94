//! DeepSeek client
//!
//! The provider capability exposed to the host: chat, streaming chat,
//! credential validation, model discovery, and cost/token estimation. One
//! logical call per invocation; timeouts are configuration-driven and
//! passed straight to the transport, retries belong to the host.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{ModelCache, NoopModelCache};
use crate::config::DeepSeekConfig;
use crate::error::{classify_http_error, LlmError};
use crate::models::{ModelCatalogManager, ModelFetchMode};
use crate::pricing;
use crate::request::{build_chat_payload, resolve_model};
use crate::response::parse_chat_response;
use crate::streaming::collect_stream;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ModelInfo};

/// Languages accepted by the coder-model `code_language` hint
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "rust",
    "go",
    "java",
    "c",
    "cpp",
    "csharp",
    "php",
    "ruby",
    "swift",
    "kotlin",
    "sql",
    "shell",
    "html",
    "css",
];

/// Provider capability contract the host consumes
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Whether the provider is enabled with a usable API key
    fn is_configured(&self) -> bool;

    /// One-shot chat completion
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Streaming chat completion; `on_delta` receives each content
    /// fragment (the delta only) as it arrives
    async fn chat_stream(
        &self,
        request: &ChatRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<ChatResponse, LlmError>;

    /// Check whether the configured credentials are accepted by the API
    async fn validate_credentials(&self) -> Result<bool, LlmError>;

    /// Available models (lenient discovery; empty means "use defaults")
    async fn models(&self) -> Result<Vec<ModelInfo>, LlmError>;

    /// Estimated USD cost for a token usage pair on the active model
    fn estimate_cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64;

    /// Heuristic token count for a text on the active model
    fn count_tokens(&self, text: &str) -> u32;

    /// Languages accepted by the `code_language` option
    fn supported_languages(&self) -> &'static [&'static str];
}

/// DeepSeek provider client
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    http: reqwest::Client,
    catalog: ModelCatalogManager,
}

impl std::fmt::Debug for DeepSeekClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("has_api_key", &!self.config.api_key.is_empty())
            .field("enabled", &self.config.enabled)
            .finish()
    }
}

impl DeepSeekClient {
    /// Client without a persistent cache (catalog refetches per process)
    pub fn new(config: DeepSeekConfig) -> Self {
        Self::with_cache(config, Arc::new(NoopModelCache))
    }

    /// Client with an injected model-list cache
    pub fn with_cache(config: DeepSeekConfig, cache: Arc<dyn ModelCache>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            catalog: ModelCatalogManager::new(cache),
        }
    }

    /// Resolved settings in effect
    pub fn config(&self) -> &DeepSeekConfig {
        &self.config
    }

    /// Configuration-UI options projection `(model id, label)`.
    ///
    /// Degrades to the static fallback catalog on any discovery failure;
    /// the UI caller never sees an error.
    pub async fn model_options(&self) -> Vec<(String, String)> {
        self.catalog.options(&self.http, &self.config).await
    }

    async fn post_chat(&self, payload: &Value) -> Result<(u16, String), LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.config.timeout())
            .json(payload)
            .send()
            .await
            .map_err(|e| LlmError::ServerError(format!("chat request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::ServerError(format!("failed to read chat response: {e}")))?;
        Ok((status, body))
    }

    /// Minimal one-token chat used as a liveness probe when the model
    /// endpoint returns an empty list during credential validation.
    async fn probe(&self) -> Result<(), LlmError> {
        let mut request = ChatRequest::new(vec![ChatMessage::user("Hi")]);
        request.max_tokens = Some(1);
        let payload = build_chat_payload(&request, &self.config);
        let (status, body) = self.post_chat(&payload).await?;
        if status == 200 {
            Ok(())
        } else {
            Err(classify_http_error(status, &body))
        }
    }
}

#[async_trait]
impl ChatProvider for DeepSeekClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        if !self.is_configured() {
            return Err(LlmError::NotConfigured);
        }

        let payload = build_chat_payload(request, &self.config);
        let (status, body) = self.post_chat(&payload).await?;
        if status != 200 {
            return Err(classify_http_error(status, &body));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| LlmError::ParseError(format!("chat response is not JSON: {e}")))?;
        parse_chat_response(json, resolve_model(request, &self.config))
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<ChatResponse, LlmError> {
        if !self.is_configured() {
            return Err(LlmError::NotConfigured);
        }

        // The caller's request stays read-only; the transient stream flag
        // lives on a working copy.
        let mut streaming_request = request.clone();
        streaming_request
            .options
            .insert("stream".to_string(), Value::Bool(true));
        let payload = build_chat_payload(&streaming_request, &self.config);

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.config.timeout())
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::ServerError(format!("chat request failed: {e}")))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status, &body));
        }

        collect_stream(response.bytes_stream(), on_delta).await
    }

    async fn validate_credentials(&self) -> Result<bool, LlmError> {
        if !self.is_configured() {
            return Ok(false);
        }

        let outcome = self
            .catalog
            .fetch(&self.http, &self.config, ModelFetchMode::Strict)
            .await;
        match outcome {
            Ok(models) if !models.is_empty() => Ok(true),
            Ok(_) => match self.probe().await {
                Ok(()) => Ok(true),
                Err(err) if err.indicates_invalid_credentials() => Ok(false),
                Err(err) => Err(err),
            },
            Err(err) if err.indicates_invalid_credentials() => Ok(false),
            // A non-auth failure proves nothing about the key; re-raise.
            Err(err) => Err(err),
        }
    }

    async fn models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        self.catalog
            .fetch(&self.http, &self.config, ModelFetchMode::Lenient)
            .await
    }

    fn estimate_cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        pricing::estimate_cost(&self.config.model, prompt_tokens, completion_tokens)
    }

    fn count_tokens(&self, text: &str) -> u32 {
        pricing::count_tokens(&self.config.model, text)
    }

    fn supported_languages(&self) -> &'static [&'static str] {
        SUPPORTED_LANGUAGES
    }
}
