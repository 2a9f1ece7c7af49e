//! Runtime orchestration.

pub mod component_registry;
pub mod tui;

pub use component_registry::ComponentId;
pub use tui::{
    Command, CustomCommand, CustomCommandCtx, CustomCommandError, RuntimeHandle, TuiRuntime,
};
