use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatApiError;

/// `max_tokens` sentinel asking the server not to cap the reply.
pub const UNBOUNDED_MAX_TOKENS: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `POST /chat/completions`.
///
/// Field order matches the serialized order on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: i64,
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// One system preamble plus one user turn; no earlier history is sent.
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)],
            temperature,
            max_tokens: UNBOUNDED_MAX_TOKENS,
            stream: false,
        }
    }
}

/// Pull `choices[0].message.content` out of a successful response body.
///
/// A missing or non-string field is an error, never an empty reply.
pub fn extract_assistant_text(body: &str) -> Result<String, ChatApiError> {
    let value: Value = serde_json::from_str(body).map_err(|error| {
        ChatApiError::MalformedResponse(format!("response body is not JSON: {error}"))
    })?;

    match value.pointer("/choices/0/message/content") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(ChatApiError::MalformedResponse(format!(
            "choices[0].message.content is {}, expected a string",
            value_type_name(other)
        ))),
        None => Err(ChatApiError::MalformedResponse(
            "missing choices[0].message.content".to_string(),
        )),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
