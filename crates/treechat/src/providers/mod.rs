use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chat_completions::ChatCompletionsConfig;
use chat_provider::{CompletionProvider, ProviderInitError};
use serde::Deserialize;
use treechat_tui::config::env_string_opt;

mod completions;
mod mock;

pub use completions::{ChatCompletionsProvider, CHAT_COMPLETIONS_PROVIDER_ID};
pub use mock::{MockProvider, MOCK_MODEL_ID, MOCK_PROVIDER_ID};

pub const DEFAULT_PROVIDER_ID: &str = CHAT_COMPLETIONS_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "TREECHAT_PROVIDER";
pub const CONFIG_PATH_ENV_VAR: &str = "TREECHAT_CONFIG_PATH";
pub const BASE_URL_ENV_VAR: &str = "TREECHAT_BASE_URL";
pub const MODEL_ENV_VAR: &str = "TREECHAT_MODEL";
pub const API_KEY_ENV_VAR: &str = "TREECHAT_API_KEY";
pub const TIMEOUT_ENV_VAR: &str = "TREECHAT_TIMEOUT_SEC";

/// On-disk provider settings. Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatCompletionsFileConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub timeout_sec: Option<u64>,
}

/// Environment values layered over the file config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_sec: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string_opt(BASE_URL_ENV_VAR),
            model: env_string_opt(MODEL_ENV_VAR),
            api_key: env_string_opt(API_KEY_ENV_VAR),
            timeout_sec: env_string_opt(TIMEOUT_ENV_VAR),
        }
    }
}

pub fn provider_from_env() -> Result<Arc<dyn CompletionProvider>, ProviderInitError> {
    let provider_id = env_string_opt(PROVIDER_ENV_VAR).map(|value| value.trim().to_string());

    match provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID) {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::new())),
        CHAT_COMPLETIONS_PROVIDER_ID => {
            let file_config = match env_string_opt(CONFIG_PATH_ENV_VAR) {
                Some(path) => Some(load_file_config(Path::new(&path))?),
                None => None,
            };
            let config = resolve_chat_completions_config(file_config, EnvOverrides::from_env())?;
            Ok(Arc::new(ChatCompletionsProvider::new(config)?))
        }
        unknown => Err(ProviderInitError::new(format!(
            "Unsupported provider '{unknown}'. Available providers: \
             {CHAT_COMPLETIONS_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        ))),
    }
}

pub fn load_file_config(path: &Path) -> Result<ChatCompletionsFileConfig, ProviderInitError> {
    let raw = std::fs::read_to_string(path).map_err(|error| {
        ProviderInitError::new(format!(
            "Failed to read {CONFIG_PATH_ENV_VAR} '{}': {error}",
            path.display()
        ))
    })?;

    serde_json::from_str(&raw).map_err(|error| {
        ProviderInitError::new(format!(
            "Invalid provider config '{}': {error}",
            path.display()
        ))
    })
}

/// Merges defaults, the optional file config and env overrides, in that order.
pub fn resolve_chat_completions_config(
    file_config: Option<ChatCompletionsFileConfig>,
    overrides: EnvOverrides,
) -> Result<ChatCompletionsConfig, ProviderInitError> {
    let mut config = ChatCompletionsConfig::default();

    if let Some(file_config) = file_config {
        config.base_url = file_config.base_url;
        config.model = file_config.model;
        if let Some(api_key) = file_config.api_key {
            config = config.with_api_key(api_key);
        }
        if let Some(temperature) = file_config.temperature {
            if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
                return Err(ProviderInitError::new(format!(
                    "temperature must be between 0 and 2, got {temperature}"
                )));
            }
            config.temperature = temperature;
        }
        if let Some(timeout_sec) = file_config.timeout_sec {
            config.timeout = timeout_from_secs(timeout_sec)?;
        }
    }

    if let Some(base_url) = overrides.base_url {
        config.base_url = base_url;
    }
    if let Some(model) = overrides.model {
        config.model = model.trim().to_string();
    }
    if let Some(api_key) = overrides.api_key {
        config = config.with_api_key(api_key);
    }
    if let Some(raw) = overrides.timeout_sec {
        let timeout_sec = raw.trim().parse::<u64>().map_err(|_| {
            ProviderInitError::new(format!(
                "{TIMEOUT_ENV_VAR} must be a positive integer, got '{raw}'"
            ))
        })?;
        config.timeout = timeout_from_secs(timeout_sec)?;
    }

    if config.model.trim().is_empty() {
        return Err(ProviderInitError::new("model must not be empty"));
    }

    Ok(config)
}

fn timeout_from_secs(timeout_sec: u64) -> Result<Duration, ProviderInitError> {
    if timeout_sec == 0 {
        return Err(ProviderInitError::new("timeout_sec must be > 0"));
    }
    Ok(Duration::from_secs(timeout_sec))
}
