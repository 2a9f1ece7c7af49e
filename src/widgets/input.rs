//! Input widget.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::component::{Component, CursorPos, Focusable};
use crate::core::input_event::InputEvent;
use crate::core::text::utils::{grapheme_segments, is_punctuation_char, is_whitespace_char};
use crate::core::text::width::visible_width;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputAction {
    Submit,
    DeleteCharBackward,
    DeleteCharForward,
    DeleteWordBackward,
    DeleteToLineStart,
    DeleteToLineEnd,
    CursorLeft,
    CursorRight,
    CursorLineStart,
    CursorLineEnd,
    CursorWordLeft,
    CursorWordRight,
}

fn action_for_key(key_id: &str) -> Option<InputAction> {
    let action = match key_id {
        "enter" => InputAction::Submit,
        "backspace" | "ctrl+h" => InputAction::DeleteCharBackward,
        "delete" | "ctrl+d" => InputAction::DeleteCharForward,
        "ctrl+w" | "alt+backspace" => InputAction::DeleteWordBackward,
        "ctrl+u" => InputAction::DeleteToLineStart,
        "ctrl+k" => InputAction::DeleteToLineEnd,
        "left" | "ctrl+b" => InputAction::CursorLeft,
        "right" | "ctrl+f" => InputAction::CursorRight,
        "home" | "ctrl+a" => InputAction::CursorLineStart,
        "end" | "ctrl+e" => InputAction::CursorLineEnd,
        "alt+left" | "ctrl+left" => InputAction::CursorWordLeft,
        "alt+right" | "ctrl+right" => InputAction::CursorWordRight,
        _ => return None,
    };
    Some(action)
}

/// Single-line input component with horizontal scrolling.
pub struct Input {
    value: String,
    cursor: usize,
    focused: bool,
    last_cursor_pos: Option<CursorPos>,
    prompt: String,
    on_submit: Option<Box<dyn FnMut(String)>>,
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            focused: false,
            last_cursor_pos: None,
            prompt: "> ".to_string(),
            on_submit: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the value and moves the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_on_submit(&mut self, handler: Option<Box<dyn FnMut(String)>>) {
        self.on_submit = handler;
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.value.len());
        while self.cursor > 0 && !self.value.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.value.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn previous_grapheme_len(&self) -> usize {
        grapheme_segments(&self.value[..self.cursor])
            .next_back()
            .map(str::len)
            .unwrap_or(0)
    }

    fn next_grapheme_len(&self) -> usize {
        grapheme_segments(&self.value[self.cursor..])
            .next()
            .map(str::len)
            .unwrap_or(0)
    }

    fn is_whitespace_segment(segment: &str) -> bool {
        segment.chars().any(is_whitespace_char)
    }

    fn is_punctuation_segment(segment: &str) -> bool {
        segment.chars().any(is_punctuation_char)
    }

    fn word_class(segment: &str) -> u8 {
        if Self::is_whitespace_segment(segment) {
            0
        } else if Self::is_punctuation_segment(segment) {
            1
        } else {
            2
        }
    }

    /// Skips whitespace, then one run of same-class graphemes.
    fn word_start_before(&self, from: usize) -> usize {
        let mut graphemes: Vec<&str> = grapheme_segments(&self.value[..from]).collect();
        let mut cursor = from;

        while graphemes.last().is_some_and(|last| Self::word_class(last) == 0) {
            cursor -= graphemes.pop().map(str::len).unwrap_or(0);
        }
        if let Some(class) = graphemes.last().map(|last| Self::word_class(last)) {
            while graphemes.last().is_some_and(|last| Self::word_class(last) == class) {
                cursor -= graphemes.pop().map(str::len).unwrap_or(0);
            }
        }
        cursor
    }

    fn word_end_after(&self, from: usize) -> usize {
        let mut graphemes = grapheme_segments(&self.value[from..]).peekable();
        let mut cursor = from;

        while let Some(segment) = graphemes.next_if(|seg| Self::word_class(seg) == 0) {
            cursor += segment.len();
        }
        if let Some(class) = graphemes.peek().map(|seg| Self::word_class(seg)) {
            while let Some(segment) = graphemes.next_if(|seg| Self::word_class(seg) == class) {
                cursor += segment.len();
            }
        }
        cursor
    }

    fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::Submit => {
                let value = self.value.clone();
                if let Some(handler) = self.on_submit.as_mut() {
                    handler(value);
                }
            }
            InputAction::DeleteCharBackward => {
                let start = self.cursor - self.previous_grapheme_len();
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            InputAction::DeleteCharForward => {
                let end = self.cursor + self.next_grapheme_len();
                self.value.replace_range(self.cursor..end, "");
            }
            InputAction::DeleteWordBackward => {
                let start = self.word_start_before(self.cursor);
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            InputAction::DeleteToLineStart => {
                self.value.replace_range(..self.cursor, "");
                self.cursor = 0;
            }
            InputAction::DeleteToLineEnd => self.value.truncate(self.cursor),
            InputAction::CursorLeft => self.cursor -= self.previous_grapheme_len(),
            InputAction::CursorRight => self.cursor += self.next_grapheme_len(),
            InputAction::CursorLineStart => self.cursor = 0,
            InputAction::CursorLineEnd => self.cursor = self.value.len(),
            InputAction::CursorWordLeft => self.cursor = self.word_start_before(self.cursor),
            InputAction::CursorWordRight => self.cursor = self.word_end_after(self.cursor),
        }
    }

    /// Byte range of `value` shown in `available` columns, keeping the cursor visible.
    fn visible_range(&self, available: usize) -> (usize, usize) {
        let graphemes: Vec<(usize, &str)> = self.value.grapheme_indices(true).collect();
        let mut start = 0;

        // One column stays reserved for the block cursor at end of line.
        while start < self.cursor && visible_width(&self.value[start..self.cursor]) + 1 > available {
            start += graphemes
                .iter()
                .find(|(idx, _)| *idx == start)
                .map(|(_, seg)| seg.len())
                .unwrap_or(1);
        }

        let mut end = start;
        let mut used = 0;
        for (idx, seg) in graphemes.iter().filter(|(idx, _)| *idx >= start) {
            let seg_width = visible_width(seg);
            if used + seg_width > available {
                break;
            }
            used += seg_width;
            end = idx + seg.len();
        }
        (start, end)
    }
}

impl Component for Input {
    fn render(&mut self, width: usize) -> Vec<String> {
        self.clamp_cursor();
        self.last_cursor_pos = None;

        let prompt_width = visible_width(&self.prompt);
        let available = width.saturating_sub(prompt_width);
        if available == 0 {
            return vec![self.prompt.clone()];
        }

        let (start, end) = self.visible_range(available);
        let cursor = self.cursor.clamp(start, end);
        let before_cursor = &self.value[start..cursor];
        let after = &self.value[cursor..end];
        let mut rest = grapheme_segments(after);
        let at_cursor = rest.next().unwrap_or(" ");
        let after_cursor = rest.as_str();

        if self.focused {
            self.last_cursor_pos = Some(CursorPos {
                row: 0,
                col: prompt_width + visible_width(before_cursor),
            });
        }

        let text = if self.focused {
            format!("{before_cursor}\x1b[7m{at_cursor}\x1b[27m{after_cursor}")
        } else {
            self.value[start..end].to_string()
        };
        vec![format!("{}{text}", self.prompt)]
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        self.last_cursor_pos
    }

    fn handle_event(&mut self, event: &InputEvent) {
        self.clamp_cursor();
        match event {
            InputEvent::Text { text, .. } => self.insert_text(text),
            InputEvent::Paste { text, .. } => {
                let cleaned = text.replace(['\r', '\n'], " ");
                self.insert_text(&cleaned);
            }
            InputEvent::Key { key_id, .. } => {
                if let Some(action) = action_for_key(key_id) {
                    self.apply(action);
                }
            }
            InputEvent::Resize { .. } | InputEvent::UnknownRaw { .. } => {}
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for Input {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
