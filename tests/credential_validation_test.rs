//! Credential validation policy: model listing first, one-token chat probe
//! as fallback, auth indicators map to `false`, everything else re-raises.

use deepseek_provider::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn configured(base_url: String) -> DeepSeekConfig {
    DeepSeekConfig {
        enabled: true,
        api_key: "sk-test".to_string(),
        base_url,
        ..Default::default()
    }
}

#[tokio::test]
async fn non_empty_model_list_proves_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "deepseek-chat"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(configured(server.uri()));
    assert!(client.validate_credentials().await.expect("validated"));
}

#[tokio::test]
async fn empty_model_list_falls_back_to_chat_probe() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(configured(server.uri()));
    assert!(client.validate_credentials().await.expect("validated"));
}

#[tokio::test]
async fn invalid_api_key_reports_false_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "bad key"}})),
        )
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(configured(server.uri()));
    assert!(!client.validate_credentials().await.expect("no raise"));
}

#[tokio::test]
async fn non_auth_errors_are_reraised() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(configured(server.uri()));
    let err = client.validate_credentials().await.unwrap_err();
    assert!(matches!(err, LlmError::ServerError(_)));
}

#[tokio::test]
async fn unconfigured_client_is_invalid_without_network() {
    let client = DeepSeekClient::new(DeepSeekConfig::default());
    assert!(!client.validate_credentials().await.expect("no raise"));
}
