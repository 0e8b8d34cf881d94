//! Request construction
//!
//! Maps a unified `ChatRequest` plus resolved settings into the vendor
//! JSON payload, applying defaults and vendor-specific quirks. The payload
//! is derived deterministically and never retained after the call.

use serde_json::{json, Map, Value};

use crate::config::{DeepSeekConfig, CODER_MODEL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::types::{ChatRequest, MessageRole};

/// Optional parameters copied into the payload only when explicitly present
const PASSTHROUGH_OPTIONS: &[&str] = &["top_p", "frequency_penalty", "presence_penalty", "stop"];

/// Resolve the active model id: request override, then config default,
/// then the hard-coded default.
pub fn resolve_model<'a>(request: &'a ChatRequest, config: &'a DeepSeekConfig) -> &'a str {
    if let Some(model) = request.model.as_deref() {
        return model;
    }
    if !config.model.is_empty() {
        return &config.model;
    }
    DEFAULT_MODEL
}

/// Build the vendor chat-completion payload.
///
/// Temperature follows request override, then config; when neither is set
/// the key is omitted entirely so the API applies its own default. The
/// `stream` flag is set only when the request asks for it.
pub fn build_chat_payload(request: &ChatRequest, config: &DeepSeekConfig) -> Value {
    let model = resolve_model(request, config).to_string();

    let mut messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m| {
            json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        })
        .collect();

    apply_code_language_hint(&mut messages, &model, request);

    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(model.clone()));
    body.insert("messages".to_string(), Value::Array(messages));

    let temperature = request.temperature.or(config.temperature);
    if let Some(t) = temperature {
        body.insert("temperature".to_string(), json!(t));
    }

    let max_tokens = request
        .max_tokens
        .unwrap_or(if config.max_tokens > 0 {
            config.max_tokens
        } else {
            DEFAULT_MAX_TOKENS
        });
    body.insert("max_tokens".to_string(), json!(max_tokens));

    for key in PASSTHROUGH_OPTIONS {
        if let Some(value) = request.options.get(*key) {
            body.insert((*key).to_string(), value.clone());
        }
    }

    if request.wants_stream() {
        body.insert("stream".to_string(), Value::Bool(true));
    }

    tracing::debug!(
        model = %model,
        temperature = ?temperature,
        max_tokens,
        stream = request.wants_stream(),
        roles = ?request.messages.iter().map(|m| m.role.as_str()).collect::<Vec<_>>(),
        "built chat completion payload"
    );

    Value::Object(body)
}

/// Prefix the first user message with a `Language:` hint when the coder
/// model is active and the request names a `code_language`. Exactly one
/// message in the payload is touched; without a user message the payload
/// is unchanged.
fn apply_code_language_hint(messages: &mut [Value], model: &str, request: &ChatRequest) {
    if model != CODER_MODEL {
        return;
    }
    let Some(language) = request.options.get("code_language").and_then(|v| v.as_str()) else {
        return;
    };

    let first_user = request
        .messages
        .iter()
        .position(|m| m.role == MessageRole::User);
    if let Some(idx) = first_user {
        if let Some(content) = messages[idx].get("content").and_then(|v| v.as_str()) {
            let prefixed = format!("Language: {language}\n\n{content}");
            messages[idx]["content"] = Value::String(prefixed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn configured() -> DeepSeekConfig {
        DeepSeekConfig {
            enabled: true,
            api_key: "sk-test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn model_resolution_prefers_request_override() {
        let mut request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        request.model = Some("deepseek-coder".to_string());
        let payload = build_chat_payload(&request, &configured());
        assert_eq!(payload["model"], "deepseek-coder");
    }

    #[test]
    fn temperature_omitted_when_unset_everywhere() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        let payload = build_chat_payload(&request, &configured());
        assert!(payload.get("temperature").is_none());
    }

    #[test]
    fn temperature_override_beats_config_default() {
        let mut config = configured();
        config.temperature = Some(0.2);
        let mut request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        request.temperature = Some(0.9);
        let payload = build_chat_payload(&request, &config);
        assert!((payload["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn passthrough_options_only_when_present() {
        let mut request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        request
            .options
            .insert("top_p".to_string(), serde_json::json!(0.95));
        let payload = build_chat_payload(&request, &configured());
        assert!((payload["top_p"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert!(payload.get("frequency_penalty").is_none());
        assert!(payload.get("presence_penalty").is_none());
        assert!(payload.get("stop").is_none());
    }

    #[test]
    fn stream_flag_only_when_requested() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        let payload = build_chat_payload(&request, &configured());
        assert!(payload.get("stream").is_none());

        let mut streaming = ChatRequest::new(vec![ChatMessage::user("hi")]);
        streaming
            .options
            .insert("stream".to_string(), serde_json::json!(true));
        let payload = build_chat_payload(&streaming, &configured());
        assert_eq!(payload["stream"], true);
    }

    #[test]
    fn coder_hint_prefixes_first_user_message_only() {
        let mut request = ChatRequest::new(vec![
            ChatMessage::system("you are helpful"),
            ChatMessage::user("write a sort"),
            ChatMessage::user("make it stable"),
        ]);
        request.model = Some(CODER_MODEL.to_string());
        request
            .options
            .insert("code_language".to_string(), serde_json::json!("rust"));

        let payload = build_chat_payload(&request, &configured());
        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages[0]["content"], "you are helpful");
        assert_eq!(messages[1]["content"], "Language: rust\n\nwrite a sort");
        assert_eq!(messages[2]["content"], "make it stable");
        // the caller's request is untouched
        assert_eq!(request.messages[1].content, "write a sort");
    }

    #[test]
    fn coder_hint_ignored_without_user_message() {
        let mut request = ChatRequest::new(vec![ChatMessage::system("sys only")]);
        request.model = Some(CODER_MODEL.to_string());
        request
            .options
            .insert("code_language".to_string(), serde_json::json!("go"));
        let payload = build_chat_payload(&request, &configured());
        assert_eq!(payload["messages"][0]["content"], "sys only");
    }

    #[test]
    fn coder_hint_ignored_for_chat_model() {
        let mut request = ChatRequest::new(vec![ChatMessage::user("hello")]);
        request
            .options
            .insert("code_language".to_string(), serde_json::json!("python"));
        let payload = build_chat_payload(&request, &configured());
        assert_eq!(payload["messages"][0]["content"], "hello");
    }
}
