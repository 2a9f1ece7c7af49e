//! Terminal runtime for treechat.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal.
//!
//! # Public API Overview
//! - Compose components into a full-screen runtime via [`TUI`].
//! - Parse input into [`InputEvent`]s keyed by stable key ids (`"ctrl+c"`, `"left"`, ...).
//! - Use text and width helpers for ANSI-safe formatting.
//!
//! # Runtime Alias
//! [`TUI`] is a type alias for `runtime::tui::TuiRuntime<T>`.

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;
pub mod widgets;

/// Built-in UI components.
pub use crate::widgets::Input;

/// Keyboard input parsing and matching helpers.
pub use crate::core::input::{matches_key, parse_key};
pub use crate::core::input_event::{parse_input_events, InputEvent};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
#[cfg(unix)]
pub use crate::platform::process_terminal::ProcessTerminal;

/// Runtime component traits.
pub use crate::core::component::{Component, CursorPos, Focusable};
/// Stable component identifier type.
pub use crate::runtime::component_registry::ComponentId;
/// Runtime commands and the cross-thread handle that dispatches them.
pub use crate::runtime::{
    Command, CustomCommand, CustomCommandCtx, CustomCommandError, RuntimeHandle,
};

/// Alias for the main runtime type.
pub type TUI<T> = crate::runtime::tui::TuiRuntime<T>;

/// ANSI-aware wrapping and truncation helpers.
pub use crate::core::text::utils::{truncate_to_width, wrap_text};
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
