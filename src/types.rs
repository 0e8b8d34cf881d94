//! Core chat types
//!
//! The unified request/response data model this adapter populates. The host
//! owns these shapes; the adapter reads `ChatRequest` (it never mutates the
//! caller's messages) and produces `ChatResponse`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name of the role
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single role-tagged chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role
    pub role: MessageRole,
    /// Text content
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Unified chat request
///
/// `options` carries the named pass-through parameters (`top_p`,
/// `frequency_penalty`, `presence_penalty`, `stop`, `stream`,
/// `code_language`). Absent keys are never synthesized into the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Ordered conversation messages
    pub messages: Vec<ChatMessage>,
    /// Per-call model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Per-call temperature override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Per-call max-tokens override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Named vendor options
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl ChatRequest {
    /// Request with messages and no overrides
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Returns the `stream` option as a boolean (false when absent)
    pub fn wants_stream(&self) -> bool {
        self.options
            .get("stream")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Token usage with derived cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Input tokens consumed
    pub prompt_tokens: u32,
    /// Output tokens generated
    pub completion_tokens: u32,
    /// Derived cost in USD; `None` when no pricing applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl Usage {
    /// Create usage statistics without a cost
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            cost: None,
        }
    }
}

/// Unified chat response
///
/// Streaming calls mutate `content` incrementally until the stream ends,
/// then return the value complete; no partial-success state is exposed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Accumulated text content
    pub content: String,
    /// Whether the response was produced by a streaming call
    pub streaming: bool,
    /// Usage record; absent when the vendor reported none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Empty streaming response ready for accumulation
    pub fn streaming() -> Self {
        Self {
            streaming: true,
            ..Default::default()
        }
    }
}

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Vendor model id
    pub id: String,
    /// Display name
    pub name: String,
    /// Model description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Context window size in tokens
    pub context_window: u32,
}
