//! ANSI escape sequence recognition.

/// Escape sequence found at a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsiSpan {
    pub start: usize,
    pub length: usize,
}

/// Returns the escape sequence starting at `pos`, if any.
///
/// Recognizes CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL|ST`), and SS3
/// (`ESC O x`). Incomplete sequences return `None`.
pub fn ansi_span_at(input: &str, pos: usize) -> Option<AnsiSpan> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    let end = match bytes[pos + 1] {
        b'[' => (pos + 2..bytes.len())
            .find(|&idx| (0x40..=0x7e).contains(&bytes[idx]))
            .map(|idx| idx + 1)?,
        b']' => osc_end(bytes, pos + 2)?,
        b'O' if pos + 2 < bytes.len() => pos + 3,
        _ => return None,
    };

    Some(AnsiSpan {
        start: pos,
        length: end - pos,
    })
}

fn osc_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(idx + 1);
        }
        if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            return Some(idx + 2);
        }
        idx += 1;
    }
    None
}

/// Removes every recognized escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(span) = ansi_span_at(input, idx) {
            idx += span.length;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}
