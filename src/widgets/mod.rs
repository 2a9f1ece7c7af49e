//! Built-in widgets.

pub mod input;

pub use input::Input;
