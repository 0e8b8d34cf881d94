//! Response parsing
//!
//! Maps vendor JSON (OpenAI-compatible shape) into the unified
//! `ChatResponse`, attaching derived cost when the vendor reported usage.

use serde::Deserialize;
use serde_json::Value;

use crate::error::LlmError;
use crate::pricing::estimate_cost;
use crate::types::{ChatResponse, Usage};

#[derive(Debug, Deserialize)]
struct VendorChatResponse {
    model: Option<String>,
    choices: Vec<VendorChoice>,
    usage: Option<VendorUsage>,
}

#[derive(Debug, Deserialize)]
struct VendorChoice {
    message: VendorMessage,
}

#[derive(Debug, Deserialize)]
struct VendorMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VendorUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

/// Parse a non-streaming chat completion response.
///
/// `fallback_model` names the model for pricing when the response omits
/// one. Absent usage leaves `usage` unset rather than attaching a zeroed
/// record.
pub fn parse_chat_response(value: Value, fallback_model: &str) -> Result<ChatResponse, LlmError> {
    let parsed: VendorChatResponse = serde_json::from_value(value)
        .map_err(|e| LlmError::ParseError(format!("unexpected response shape: {e}")))?;

    let content = parsed
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| {
            LlmError::ParseError("response contains no choices[0].message.content".to_string())
        })?;

    let usage = parsed.usage.map(|u| {
        let prompt = u.prompt_tokens.unwrap_or(0);
        let completion = u.completion_tokens.unwrap_or(0);
        let model = parsed.model.as_deref().unwrap_or(fallback_model);
        Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            cost: Some(estimate_cost(model, prompt, completion)),
        }
    });

    Ok(ChatResponse {
        content,
        streaming: false,
        usage,
    })
}
