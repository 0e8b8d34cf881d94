//! Provider configuration
//!
//! Stored plugin configuration merged with caller-supplied overrides into
//! one coherent settings object. Resolution fails closed: invalid or
//! missing input yields a disabled config, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default model when neither the request nor the config names one
pub const DEFAULT_MODEL: &str = "deepseek-chat";
/// Coder-specialized model id
pub const CODER_MODEL: &str = "deepseek-coder";
/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekConfig {
    /// Whether the provider is enabled
    pub enabled: bool,
    /// API key (secret)
    pub api_key: String,
    /// Base endpoint URL, trailing slash trimmed
    pub base_url: String,
    /// Default model id
    pub model: String,
    /// Default temperature; omitted from payloads when `None`
    pub temperature: Option<f64>,
    /// Default max tokens
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Caller-supplied partial settings for `DeepSeekConfig::resolve`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub enabled: Option<bool>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl DeepSeekConfig {
    /// Usable when enabled and holding a non-empty API key. An unusable
    /// config degrades to defaults; it never raises.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Merge caller overrides over stored settings.
    ///
    /// No overrides means the stored config verbatim; otherwise a
    /// field-wise right-biased merge where explicit values win and missing
    /// keys fall back to stored values.
    pub fn resolve(overrides: Option<&ConfigOverrides>, stored: &Self) -> Self {
        let Some(ov) = overrides else {
            return stored.clone();
        };

        Self {
            enabled: ov.enabled.unwrap_or(stored.enabled),
            api_key: ov.api_key.clone().unwrap_or_else(|| stored.api_key.clone()),
            base_url: trim_base_url(
                ov.base_url
                    .clone()
                    .unwrap_or_else(|| stored.base_url.clone()),
            ),
            model: ov.model.clone().unwrap_or_else(|| stored.model.clone()),
            temperature: ov.temperature.or(stored.temperature),
            max_tokens: ov.max_tokens.unwrap_or(stored.max_tokens),
            timeout_secs: ov.timeout_secs.unwrap_or(stored.timeout_secs),
        }
    }

    /// Parse stored plugin configuration from raw JSON, failing closed.
    ///
    /// A non-object value, or any individually malformed field, leaves that
    /// field at its default; a completely invalid input yields a disabled
    /// config.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let defaults = Self::default();
        Self {
            enabled: obj
                .get("enabled")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.enabled),
            api_key: obj
                .get("api_key")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            base_url: trim_base_url(
                obj.get("base_url")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_BASE_URL)
                    .to_string(),
            ),
            model: obj
                .get("model")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            temperature: obj.get("temperature").and_then(Value::as_f64),
            max_tokens: obj
                .get("max_tokens")
                .and_then(Value::as_u64)
                .map(|v| v as u32)
                .unwrap_or(defaults.max_tokens),
            timeout_secs: obj
                .get("timeout_secs")
                .and_then(Value::as_u64)
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

fn trim_base_url(url: String) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
