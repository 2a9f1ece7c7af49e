//! Transport-only client for OpenAI-compatible chat-completions endpoints.
//!
//! One request carries a system preamble and a single user turn, is sent
//! non-streaming, and yields the first choice's message content. There is no
//! retry: every failure is surfaced to the caller as a [`ChatApiError`].

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod url;

pub use client::{CancellationSignal, ChatCompletionsClient};
pub use config::ChatCompletionsConfig;
pub use error::ChatApiError;
pub use payload::{extract_assistant_text, ChatCompletionRequest, ChatMessage};
pub use url::{chat_completions_endpoint, DEFAULT_BASE_URL};
