//! Model catalog discovery
//!
//! Fetches, parses, caches, and falls back for the list of available
//! models. One state machine serves both error modes: strict (credential
//! validation raises every classified error) and lenient (normal catalog
//! population logs and degrades to an empty list, which callers treat as
//! "use defaults").

use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::ModelCache;
use crate::config::DeepSeekConfig;
use crate::error::{classify_http_error, LlmError};
use crate::types::ModelInfo;

/// Cache key for the runtime model list
pub const MODELS_CACHE_KEY: &str = "deepseek:models";
/// Distinct cache key for the configuration-UI options projection
pub const MODEL_OPTIONS_CACHE_KEY: &str = "deepseek:model_options";
/// Catalog freshness window
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Vendor-wide context window used when the listing omits one
pub const DEFAULT_CONTEXT_WINDOW: u32 = 32_768;

/// Static fallback catalog used when discovery is unavailable
pub static FALLBACK_MODELS: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
    vec![
        ModelInfo {
            id: "deepseek-chat".to_string(),
            name: "DeepSeek Chat".to_string(),
            description: Some("General-purpose chat model".to_string()),
            context_window: DEFAULT_CONTEXT_WINDOW,
        },
        ModelInfo {
            id: "deepseek-coder".to_string(),
            name: "DeepSeek Coder".to_string(),
            description: Some("Code-specialized model".to_string()),
            context_window: DEFAULT_CONTEXT_WINDOW,
        },
    ]
});

/// Error propagation mode for a catalog fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFetchMode {
    /// Raise every classified error (credential validation)
    Strict,
    /// Log and return an empty list (catalog population)
    Lenient,
}

/// Per-instance catalog state: an in-process list plus the external cache.
pub struct ModelCatalogManager {
    cache: Arc<dyn ModelCache>,
    memory: Mutex<Vec<ModelInfo>>,
}

impl ModelCatalogManager {
    pub fn new(cache: Arc<dyn ModelCache>) -> Self {
        Self {
            cache,
            memory: Mutex::new(Vec::new()),
        }
    }

    /// Fetch the model catalog.
    ///
    /// Order: in-process list, not-configured fallback, external cache,
    /// network. Successful network results are adopted in process and
    /// written through to the cache with a fixed TTL.
    pub async fn fetch(
        &self,
        http: &reqwest::Client,
        config: &DeepSeekConfig,
        mode: ModelFetchMode,
    ) -> Result<Vec<ModelInfo>, LlmError> {
        if let Ok(memory) = self.memory.lock() {
            if !memory.is_empty() {
                return Ok(memory.clone());
            }
        }

        if !config.is_configured() {
            return Ok(FALLBACK_MODELS.clone());
        }

        if let Some(cached) = self.cache.get(MODELS_CACHE_KEY) {
            if let Ok(models) = serde_json::from_value::<Vec<ModelInfo>>(cached) {
                if !models.is_empty() {
                    self.adopt(&models);
                    return Ok(models);
                }
            }
        }

        match self.fetch_from_network(http, config).await {
            Ok(models) => {
                self.adopt(&models);
                if let Ok(value) = serde_json::to_value(&models) {
                    self.cache.put(MODELS_CACHE_KEY, value, CACHE_TTL);
                }
                Ok(models)
            }
            Err(err) => match mode {
                ModelFetchMode::Strict => Err(err),
                ModelFetchMode::Lenient => {
                    tracing::warn!(error = %err, "model discovery failed, degrading to defaults");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Configuration-UI projection: `(id, label)` pairs, cached under a
    /// distinct key. Discovery failures degrade to the fallback catalog;
    /// the UI caller never sees an error.
    pub async fn options(
        &self,
        http: &reqwest::Client,
        config: &DeepSeekConfig,
    ) -> Vec<(String, String)> {
        if let Some(cached) = self.cache.get(MODEL_OPTIONS_CACHE_KEY) {
            if let Ok(options) = serde_json::from_value::<Vec<(String, String)>>(cached) {
                if !options.is_empty() {
                    return options;
                }
            }
        }

        let models = match self.fetch(http, config, ModelFetchMode::Lenient).await {
            Ok(models) if !models.is_empty() => models,
            _ => FALLBACK_MODELS.clone(),
        };

        let options: Vec<(String, String)> = models
            .iter()
            .map(|m| (m.id.clone(), m.name.clone()))
            .collect();
        if let Ok(value) = serde_json::to_value(&options) {
            self.cache.put(MODEL_OPTIONS_CACHE_KEY, value, CACHE_TTL);
        }
        options
    }

    async fn fetch_from_network(
        &self,
        http: &reqwest::Client,
        config: &DeepSeekConfig,
    ) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/models", config.base_url);
        let response = http
            .get(&url)
            .bearer_auth(&config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(config.timeout())
            .send()
            .await
            .map_err(|e| LlmError::ServerError(format!("model listing request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::ServerError(format!("failed to read model listing: {e}")))?;

        if status != 200 {
            return Err(classify_http_error(status, &body));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| LlmError::ParseError(format!("model listing is not JSON: {e}")))?;
        Ok(parse_model_list(&json))
    }

    fn adopt(&self, models: &[ModelInfo]) {
        if models.is_empty() {
            return;
        }
        if let Ok(mut memory) = self.memory.lock() {
            *memory = models.to_vec();
        }
    }

    /// Drop the in-process list (tests and config changes)
    pub fn clear(&self) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.clear();
        }
    }
}

/// Parse the vendor `data` array into sorted model descriptors.
///
/// Non-object entries and entries without an `id` are skipped; `name`
/// defaults to a humanized id and `context_window` (or its
/// `input_token_limit` alias) to the vendor-wide constant.
pub fn parse_model_list(json: &Value) -> Vec<ModelInfo> {
    let Some(data) = json.get("data").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut models: Vec<ModelInfo> = data
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let id = obj.get("id")?.as_str()?.to_string();
            let name = obj
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| humanize_model_id(&id));
            let description = obj
                .get("description")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let context_window = obj
                .get("context_window")
                .or_else(|| obj.get("input_token_limit"))
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .unwrap_or(DEFAULT_CONTEXT_WINDOW);
            Some(ModelInfo {
                id,
                name,
                description,
                context_window,
            })
        })
        .collect();

    models.sort_by(|a, b| a.name.cmp(&b.name));
    models
}

/// Humanize a model id: hyphens to spaces, title case.
pub fn humanize_model_id(id: &str) -> String {
    id.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
