//! Error types for the DeepSeek adapter
//!
//! One taxonomy covers every failure surface: authentication, rate limiting,
//! server/transport failures, malformed responses, and mid-stream errors.
//! Catalog discovery degrades on these errors; chat and credential
//! validation raise them.

use serde_json::Value;
use thiserror::Error;

/// Unified error type for all adapter operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// The adapter is disabled or has no API key. Catalog paths treat this
    /// as a signal to fall back to defaults rather than an exception.
    #[error("DeepSeek provider is not configured")]
    NotConfigured,

    /// HTTP 401 or an auth-indicating vendor message
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// HTTP 429
    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    /// HTTP 5xx or a transport-level failure
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success HTTP status
    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    /// Response body is not JSON or lacks the expected fields
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Transport failure while consuming an SSE stream. Partial content
    /// accumulated before the failure is discarded.
    #[error("Streaming error: {message}")]
    StreamError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LlmError {
    /// Shorthand for a stream error without an underlying cause.
    pub fn stream(message: impl Into<String>) -> Self {
        Self::StreamError {
            message: message.into(),
            source: None,
        }
    }

    /// True when the error message carries an authentication indicator.
    ///
    /// Credential validation maps these to `Ok(false)` instead of
    /// propagating; every other error is re-raised since it does not prove
    /// the key is invalid.
    pub fn indicates_invalid_credentials(&self) -> bool {
        let message = self.to_string().to_lowercase();
        message.contains("invalid api key") || message.contains("401")
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::ServerError(err.to_string())
    }
}

/// Classify a non-success HTTP response into the adapter taxonomy.
///
/// 401 always maps to "Invalid API key"; 429 and 5xx prefer the
/// vendor-supplied message when one can be extracted from the body.
pub fn classify_http_error(status: u16, body: &str) -> LlmError {
    let vendor_message = extract_error_message(body);

    match status {
        401 => LlmError::AuthenticationError("Invalid API key".to_string()),
        429 => LlmError::RateLimitError(
            vendor_message.unwrap_or_else(|| "Rate limit exceeded".to_string()),
        ),
        code if code >= 500 => LlmError::ServerError(
            vendor_message.unwrap_or_else(|| format!("Server error (HTTP {code})")),
        ),
        code => LlmError::ApiError {
            code,
            message: vendor_message.unwrap_or_else(|| format!("API error (HTTP {code})")),
        },
    }
}

/// Extract a human-readable message from a vendor error body.
///
/// Accepts the OpenAI-style envelope (`error.message`, `error.code`), a
/// top-level string `error`, or a top-level `message`; falls back to the
/// raw trimmed body, or `None` when the body is empty.
pub fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("error") {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Object(obj)) => {
                if let Some(msg) = obj.get("message").and_then(|v| v.as_str()) {
                    return Some(msg.to_string());
                }
                if let Some(code) = obj.get("code").and_then(|v| v.as_str()) {
                    return Some(code.to_string());
                }
            }
            _ => {}
        }
        if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
            return Some(msg.to_string());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
