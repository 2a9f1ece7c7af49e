use std::time::Duration;

use crate::url::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "local-model";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Transport configuration for chat-completions requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionsConfig {
    /// Base URL; `/chat/completions` is appended when missing.
    pub base_url: String,
    pub model: String,
    /// Optional bearer token passed to `Authorization`.
    pub api_key: Option<String>,
    pub temperature: f64,
    /// Upper bound for one request, from send to parsed body.
    pub timeout: Duration,
}

impl Default for ChatCompletionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ChatCompletionsConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Blank keys are treated as absent.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.trim().is_empty() {
            None
        } else {
            Some(api_key)
        };
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
