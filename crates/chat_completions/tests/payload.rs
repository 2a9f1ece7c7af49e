use chat_completions::payload::UNBOUNDED_MAX_TOKENS;
use chat_completions::{extract_assistant_text, ChatApiError, ChatCompletionRequest};
use serde_json::json;

#[test]
fn request_serializes_to_wire_contract() {
    let request = ChatCompletionRequest::new("local-model", "be helpful", "Hi", 0.7);
    let value = serde_json::to_value(&request).expect("serialize request");

    assert_eq!(
        value,
        json!({
            "model": "local-model",
            "messages": [
                {"role": "system", "content": "be helpful"},
                {"role": "user", "content": "Hi"}
            ],
            "temperature": 0.7,
            "max_tokens": -1,
            "stream": false
        })
    );
}

#[test]
fn request_field_order_is_stable() {
    let request = ChatCompletionRequest::new("m", "s", "u", 0.5);
    let text = serde_json::to_string(&request).expect("serialize request");
    let positions = ["\"model\"", "\"messages\"", "\"temperature\"", "\"max_tokens\"", "\"stream\""]
        .iter()
        .map(|key| text.find(key).expect("key present"))
        .collect::<Vec<_>>();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert_eq!(request.max_tokens, UNBOUNDED_MAX_TOKENS);
}

#[test]
fn extracts_first_choice_content() {
    let body = json!({
        "id": "chatcmpl-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "Hello there"}},
            {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
        ]
    })
    .to_string();

    assert_eq!(
        extract_assistant_text(&body).expect("content"),
        "Hello there"
    );
}

#[test]
fn empty_string_content_is_accepted_verbatim() {
    let body = r#"{"choices":[{"message":{"content":""}}]}"#;
    assert_eq!(extract_assistant_text(body).expect("content"), "");
}

#[test]
fn missing_content_is_malformed() {
    for body in [
        r#"{"choices":[]}"#,
        r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
        r#"{"object":"chat.completion"}"#,
    ] {
        assert!(
            matches!(
                extract_assistant_text(body),
                Err(ChatApiError::MalformedResponse(message)) if message.contains("missing")
            ),
            "body should be malformed: {body}"
        );
    }
}

#[test]
fn non_string_content_is_malformed() {
    let body = r#"{"choices":[{"message":{"content":null}}]}"#;
    assert!(matches!(
        extract_assistant_text(body),
        Err(ChatApiError::MalformedResponse(message)) if message.contains("null")
    ));
}

#[test]
fn non_json_body_is_malformed() {
    assert!(matches!(
        extract_assistant_text("<html>oops</html>"),
        Err(ChatApiError::MalformedResponse(message)) if message.contains("not JSON")
    ));
}
