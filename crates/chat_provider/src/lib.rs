//! Minimal provider-agnostic contract for one chat completion.
//!
//! A request carries a system preamble and exactly one user turn; the provider
//! answers with the assistant text or a [`ProviderError`]. Transport details
//! and tree bookkeeping live elsewhere.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

/// Identifier for one completion request.
pub type RequestId = u64;

/// Shared cancellation flag for a request.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a provider before any request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Input for one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub request_id: RequestId,
    /// Tree node the reply will be attached under.
    pub parent_id: u64,
    pub system_prompt: String,
    pub prompt: String,
}

/// Failure of a single completion request. None of these end the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Another request is still outstanding.
    Busy,
    Http { status: u16, message: String },
    MalformedResponse(String),
    Timeout(Duration),
    Cancelled,
    Transport(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("Busy: waiting for the current response"),
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::MalformedResponse(detail) => write!(f, "Malformed response: {detail}"),
            Self::Timeout(after) => write!(f, "Request timed out after {}s", after.as_secs()),
            Self::Cancelled => f.write_str("Request cancelled"),
            Self::Transport(detail) => write!(f, "Request failed: {detail}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Immutable metadata describing a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for executing one completion request.
pub trait CompletionProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Executes a request to completion on the calling thread.
    ///
    /// Providers should poll `cancel` and return [`ProviderError::Cancelled`]
    /// once it is set.
    fn complete(
        &self,
        req: &CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<String, ProviderError>;
}
