//! Structured input events produced by the runtime.

use crate::core::input::{parse_key, parse_text, split_sequences, PASTE_END, PASTE_START};

/// Input event delivered to components.
///
/// `raw` is the exact sequence received from the terminal; `key_id` is the
/// normalized identifier used for key matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { raw: String, key_id: String },
    Text { raw: String, text: String },
    Paste { raw: String, text: String },
    Resize { columns: u16, rows: u16 },
    UnknownRaw { raw: String },
}

pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    split_sequences(data)
        .into_iter()
        .map(|piece| {
            if let Some(body) = piece.strip_prefix(PASTE_START) {
                return InputEvent::Paste {
                    raw: piece.to_string(),
                    text: body.strip_suffix(PASTE_END).unwrap_or(body).to_string(),
                };
            }

            if let Some(text) = parse_text(piece) {
                return InputEvent::Text {
                    raw: piece.to_string(),
                    text,
                };
            }

            match parse_key(piece) {
                Some(key_id) => InputEvent::Key {
                    raw: piece.to_string(),
                    key_id,
                },
                None => InputEvent::UnknownRaw {
                    raw: piece.to_string(),
                },
            }
        })
        .collect()
}
