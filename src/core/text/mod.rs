//! Text helpers (ANSI recognition, width calculation, truncation, wrapping).
//!
//! These helpers are pure (string in/string out) so widgets can use them
//! without touching the render layer.

pub mod ansi;
pub mod utils;
pub mod width;
