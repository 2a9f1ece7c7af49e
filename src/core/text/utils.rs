//! Truncation, padding, and wrapping helpers.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::ansi_span_at;
use super::width::{grapheme_width, visible_width};

const ANSI_RESET: &str = "\x1b[0m";

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

pub fn is_whitespace_char(ch: char) -> bool {
    ch.is_whitespace()
}

pub fn is_punctuation_char(ch: char) -> bool {
    ch.is_ascii_punctuation()
}

/// Cuts `text` to at most `max_width` columns, appending `ellipsis` when
/// anything was dropped. Escape sequences are kept and a reset is emitted
/// before the ellipsis.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    if ellipsis_width >= max_width {
        return ellipsis.chars().take(max_width).collect();
    }
    let target_width = max_width - ellipsis_width;

    let mut truncated = String::with_capacity(text.len());
    let mut current_width = 0;
    let mut idx = 0;
    'outer: while idx < text.len() {
        if let Some(span) = ansi_span_at(text, idx) {
            truncated.push_str(&text[idx..idx + span.length]);
            idx += span.length;
            continue;
        }

        let run_end = next_escape_or_end(text, idx);
        for grapheme in grapheme_segments(&text[idx..run_end]) {
            let width = grapheme_width(grapheme);
            if current_width + width > target_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current_width += width;
        }
        idx = run_end;
    }

    truncated.push_str(ANSI_RESET);
    truncated.push_str(ellipsis);
    truncated
}

/// Word-wraps plain text to `width` columns.
///
/// Explicit newlines start a new line; words wider than `width` are split at
/// grapheme boundaries. An empty input yields one empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_word_bounds() {
            let word_width = visible_width(word);
            if current_width + word_width <= width {
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if word.trim().is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current).trim_end().to_string());
                current_width = 0;
            }

            for grapheme in grapheme_segments(word) {
                let grapheme_cols = grapheme_width(grapheme);
                if current_width + grapheme_cols > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push_str(grapheme);
                current_width += grapheme_cols;
            }
        }

        lines.push(current.trim_end().to_string());
    }

    lines
}

fn next_escape_or_end(input: &str, from: usize) -> usize {
    input[from..]
        .find('\x1b')
        .map(|offset| from + offset)
        .filter(|&pos| pos > from)
        .unwrap_or(input.len())
}
