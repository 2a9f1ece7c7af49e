//! Key identification and chunk splitting for legacy terminal input.
//!
//! Key ids are lowercase names joined with modifiers, e.g. `up`, `enter`,
//! `ctrl+c`, `alt+left`, `shift+tab`.

pub const PASTE_START: &str = "\x1b[200~";
pub const PASTE_END: &str = "\x1b[201~";

const ESC: u8 = 0x1b;

const LEGACY_SEQUENCES: &[(&str, &str)] = &[
    ("\x1b[A", "up"),
    ("\x1bOA", "up"),
    ("\x1b[B", "down"),
    ("\x1bOB", "down"),
    ("\x1b[C", "right"),
    ("\x1bOC", "right"),
    ("\x1b[D", "left"),
    ("\x1bOD", "left"),
    ("\x1b[H", "home"),
    ("\x1bOH", "home"),
    ("\x1b[1~", "home"),
    ("\x1b[7~", "home"),
    ("\x1b[F", "end"),
    ("\x1bOF", "end"),
    ("\x1b[4~", "end"),
    ("\x1b[8~", "end"),
    ("\x1b[2~", "insert"),
    ("\x1b[3~", "delete"),
    ("\x1b[5~", "pageUp"),
    ("\x1b[6~", "pageDown"),
    ("\x1b[Z", "shift+tab"),
    ("\x1bOM", "enter"),
    ("\x1bb", "alt+left"),
    ("\x1bf", "alt+right"),
    ("\x1b\x7f", "alt+backspace"),
    ("\x1b\r", "alt+enter"),
];

/// Returns the normalized key id for one terminal sequence.
///
/// Printable single characters map to themselves (`a`, `?`); upper-case
/// letters map to `shift+<letter>`.
pub fn parse_key(data: &str) -> Option<String> {
    if let Some((_, key_id)) = LEGACY_SEQUENCES.iter().find(|(seq, _)| *seq == data) {
        return Some((*key_id).to_string());
    }

    if let Some(key_id) = parse_modified_csi(data) {
        return Some(key_id);
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    if rest.is_empty() {
        return single_char_key(first);
    }

    if first == '\x1b' {
        let mut rest_chars = rest.chars();
        if let (Some(ch), None) = (rest_chars.next(), rest_chars.next()) {
            if !ch.is_control() {
                return single_char_key(ch).map(|key| format!("alt+{key}"));
            }
        }
    }

    None
}

fn single_char_key(ch: char) -> Option<String> {
    let key = match ch {
        '\x1b' => "escape".to_string(),
        '\t' => "tab".to_string(),
        '\r' | '\n' => "enter".to_string(),
        '\x7f' | '\x08' => "backspace".to_string(),
        '\x00' => "ctrl+space".to_string(),
        ' ' => "space".to_string(),
        '\x01'..='\x1a' => {
            let letter = (b'a' + (ch as u8) - 1) as char;
            format!("ctrl+{letter}")
        }
        ch if ch.is_ascii_uppercase() => format!("shift+{}", ch.to_ascii_lowercase()),
        ch if !ch.is_control() => ch.to_string(),
        _ => return None,
    };
    Some(key)
}

/// `CSI 1 ; <mod> <A-D|H|F>` as sent by xterm for modified arrows.
fn parse_modified_csi(data: &str) -> Option<String> {
    let body = data.strip_prefix("\x1b[1;")?;
    let mut chars = body.chars();
    let final_char = chars.next_back()?;
    let modifier: u8 = chars.as_str().parse().ok()?;

    let key = match final_char {
        'A' => "up",
        'B' => "down",
        'C' => "right",
        'D' => "left",
        'H' => "home",
        'F' => "end",
        _ => return None,
    };

    let bits = modifier.checked_sub(1)?;
    let mut parts = Vec::new();
    if bits & 1 != 0 {
        parts.push("shift");
    }
    if bits & 4 != 0 {
        parts.push("ctrl");
    }
    if bits & 2 != 0 {
        parts.push("alt");
    }
    parts.push(key);
    Some(parts.join("+"))
}

/// Returns the text carried by `data` when it is entirely printable.
pub fn parse_text(data: &str) -> Option<String> {
    if data.is_empty() || data.chars().any(|ch| ch.is_control()) {
        return None;
    }
    Some(data.to_string())
}

/// Whether `data` is the sequence for `key_id`.
pub fn matches_key(data: &str, key_id: &str) -> bool {
    parse_key(data).is_some_and(|parsed| parsed == key_id)
}

/// Splits one read chunk into individual sequences.
///
/// Escape sequences and control bytes become separate pieces, runs of
/// printable text stay together, and a bracketed paste is kept whole
/// (an unterminated paste swallows the rest of the chunk).
pub fn split_sequences(data: &str) -> Vec<&str> {
    let bytes = data.as_bytes();
    let mut pieces = Vec::new();
    let mut idx = 0;

    while idx < bytes.len() {
        let rest = &data[idx..];
        let len = if rest.starts_with(PASTE_START) {
            rest[PASTE_START.len()..]
                .find(PASTE_END)
                .map(|end| PASTE_START.len() + end + PASTE_END.len())
                .unwrap_or(rest.len())
        } else if bytes[idx] == ESC {
            escape_len(rest)
        } else if bytes[idx] < 0x20 || bytes[idx] == 0x7f {
            1
        } else {
            rest.find(|ch: char| ch.is_control())
                .unwrap_or(rest.len())
        };

        pieces.push(&rest[..len]);
        idx += len;
    }

    pieces
}

fn escape_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    match bytes.get(1) {
        None | Some(&ESC) => 1,
        Some(b'[') => (2..bytes.len())
            .find(|&idx| (0x40..=0x7e).contains(&bytes[idx]))
            .map(|idx| idx + 1)
            .unwrap_or(bytes.len()),
        Some(b'O') if bytes.len() > 2 => 3,
        Some(_) => rest[1..]
            .chars()
            .next()
            .map(|ch| 1 + ch.len_utf8())
            .unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::{matches_key, parse_key, parse_text, split_sequences};

    #[test]
    fn arrows_in_both_encodings() {
        assert_eq!(parse_key("\x1b[A").as_deref(), Some("up"));
        assert_eq!(parse_key("\x1bOB").as_deref(), Some("down"));
        assert_eq!(parse_key("\x1b[1;5C").as_deref(), Some("ctrl+right"));
        assert_eq!(parse_key("\x1b[1;2D").as_deref(), Some("shift+left"));
    }

    #[test]
    fn control_bytes_map_to_named_keys() {
        assert_eq!(parse_key("\r").as_deref(), Some("enter"));
        assert_eq!(parse_key("\t").as_deref(), Some("tab"));
        assert_eq!(parse_key("\x1b").as_deref(), Some("escape"));
        assert_eq!(parse_key("\x03").as_deref(), Some("ctrl+c"));
        assert_eq!(parse_key("\x7f").as_deref(), Some("backspace"));
        assert_eq!(parse_key("\x1b[Z").as_deref(), Some("shift+tab"));
    }

    #[test]
    fn printable_and_alt_keys() {
        assert_eq!(parse_key("q").as_deref(), Some("q"));
        assert_eq!(parse_key("Q").as_deref(), Some("shift+q"));
        assert_eq!(parse_key("\x1bx").as_deref(), Some("alt+x"));
        assert!(matches_key("\x1bb", "alt+left"));
    }

    #[test]
    fn text_excludes_control_characters() {
        assert_eq!(parse_text("héllo").as_deref(), Some("héllo"));
        assert!(parse_text("a\rb").is_none());
        assert!(parse_text("").is_none());
    }

    #[test]
    fn split_separates_keys_from_text() {
        assert_eq!(
            split_sequences("ab\x1b[A\x1b[Bc\r"),
            vec!["ab", "\x1b[A", "\x1b[B", "c", "\r"]
        );
    }

    #[test]
    fn split_keeps_paste_whole() {
        assert_eq!(
            split_sequences("x\x1b[200~a\rb\x1b[201~\x1b"),
            vec!["x", "\x1b[200~a\rb\x1b[201~", "\x1b"]
        );
    }

    #[test]
    fn split_handles_double_escape() {
        assert_eq!(split_sequences("\x1b\x1b"), vec!["\x1b", "\x1b"]);
    }
}
