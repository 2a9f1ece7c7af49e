use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum ChatApiError {
    InvalidBaseUrl(String),
    /// The API key cannot be sent as an `Authorization` header value.
    InvalidApiKey,
    Request(reqwest::Error),
    /// Non-2xx response. `message` is the server's error text when it sent one.
    HttpError {
        status: StatusCode,
        message: String,
    },
    /// 2xx response without a string at `choices[0].message.content`.
    MalformedResponse(String),
    Serde(JsonError),
    Timeout(Duration),
    Cancelled,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorValue>,
}

/// Servers disagree on the error shape: some send an object, some a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorValue {
    Object { message: Option<String> },
    Text(String),
}

impl ErrorValue {
    fn message(&self) -> Option<&str> {
        let message = match self {
            Self::Object { message } => message.as_deref()?,
            Self::Text(text) => text.as_str(),
        };
        let message = message.trim();
        (!message.is_empty()).then_some(message)
    }
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::InvalidApiKey => write!(f, "API key is not a valid header value"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::HttpError { status, message } => {
                write!(f, "HTTP {} {message}", status.as_u16())
            }
            Self::MalformedResponse(message) => write!(f, "malformed response: {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Timeout(after) => write!(f, "request timed out after {}s", after.as_secs()),
            Self::Cancelled => write!(f, "request was cancelled"),
        }
    }
}

impl std::error::Error for ChatApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ChatApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Best-effort human message for a failed response body.
///
/// Prefers `error.message` (or a string `error`), then the raw body, then the
/// status' canonical reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.error.as_ref().and_then(ErrorValue::message) {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
