use std::time::Duration;

use chat_completions::{ChatApiError, ChatCompletionsClient, ChatCompletionsConfig};
use serde_json::Value;

#[test]
fn http_request_targets_normalized_endpoint() {
    let config = ChatCompletionsConfig::new("local-model").with_base_url("http://localhost:1234/v1/");
    let client = ChatCompletionsClient::new(config).expect("client");
    let request = client.request_for("sys", "hello");

    let http_request = client
        .build_request(&request)
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        http_request.url().as_str(),
        "http://localhost:1234/v1/chat/completions"
    );
    assert_eq!(http_request.method(), "POST");
    assert_eq!(
        http_request.headers()["content-type"],
        "application/json"
    );
    assert!(http_request.headers().get("authorization").is_none());

    let body = http_request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("buffered body");
    let value: Value = serde_json::from_slice(body).expect("json body");
    assert_eq!(value["model"], "local-model");
    assert_eq!(value["messages"][1]["content"], "hello");
}

#[test]
fn http_request_carries_bearer_key_when_configured() {
    let config = ChatCompletionsConfig::new("gpt").with_api_key("sk-test");
    let client = ChatCompletionsClient::new(config).expect("client");
    let http_request = client
        .build_request(&client.request_for("sys", "hi"))
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(http_request.headers()["authorization"], "Bearer sk-test");
}

#[test]
fn blank_api_key_is_ignored() {
    let config = ChatCompletionsConfig::new("gpt").with_api_key("   ");
    assert_eq!(config.api_key, None);
}

#[test]
fn config_defaults_match_local_server() {
    let config = ChatCompletionsConfig::default();
    assert_eq!(config.base_url, "http://localhost:1234/v1");
    assert_eq!(config.model, "local-model");
    assert_eq!(config.temperature, 0.7);
    assert_eq!(config.timeout, Duration::from_secs(120));
}

#[test]
fn invalid_base_url_fails_client_construction() {
    let config = ChatCompletionsConfig::new("m").with_base_url("file:///tmp/socket");
    let error = ChatCompletionsClient::new(config).expect_err("file scheme must fail");
    assert!(matches!(error, ChatApiError::InvalidBaseUrl(_)));
}

#[test]
fn api_key_with_control_characters_fails_client_construction() {
    let config = ChatCompletionsConfig::new("m").with_api_key("sk-abc\ndef");
    let error = ChatCompletionsClient::new(config).expect_err("newline in key must fail");
    assert!(matches!(error, ChatApiError::InvalidApiKey));
    assert_eq!(error.to_string(), "API key is not a valid header value");
}
