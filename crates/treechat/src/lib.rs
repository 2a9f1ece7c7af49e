//! Terminal chat client that keeps every edited message as a branch.
//!
//! ## Provider bootstrap
//!
//! - `TREECHAT_PROVIDER=chat-completions` (default) talks to an OpenAI-compatible
//!   `/chat/completions` endpoint.
//! - `TREECHAT_PROVIDER=mock` answers locally with a deterministic echo.
//!
//! The chat-completions provider reads an optional JSON file named by
//! `TREECHAT_CONFIG_PATH`:
//!
//! ```json
//! {
//!   "base_url": "http://localhost:1234/v1",
//!   "model": "local-model",
//!   "api_key": "optional",
//!   "temperature": 0.7,
//!   "timeout_sec": 120
//! }
//! ```
//!
//! Unknown fields are rejected. `TREECHAT_BASE_URL`, `TREECHAT_MODEL`,
//! `TREECHAT_API_KEY` and `TREECHAT_TIMEOUT_SEC` override the file.
//!
//! ## Request contract
//!
//! Each request carries the system prompt (`TREECHAT_SYSTEM_PROMPT` or the
//! built-in default) and the new message as the only user turn. At most one
//! request is outstanding; the reply is attached under the message that
//! triggered it.

pub mod app;
pub mod commands;
pub mod providers;
pub mod runtime;
pub mod tui;
