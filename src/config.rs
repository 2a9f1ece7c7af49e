//! Environment configuration.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Raw terminal write log (`TREECHAT_WRITE_LOG`).
    pub write_log: Option<PathBuf>,
    /// Tracing log file (`TREECHAT_LOG`).
    pub log_path: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt("TREECHAT_WRITE_LOG").map(PathBuf::from),
            log_path: env_string_opt("TREECHAT_LOG").map(PathBuf::from),
        }
    }
}

/// Unset and blank values are both treated as absent.
pub fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
