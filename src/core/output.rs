//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes flow through `OutputGate::flush(..)`.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw bytes/control sequences (UTF-8 string) to be written to the terminal.
    Bytes(String),
    BytesStatic(&'static str),

    HideCursor,
    ShowCursor,

    /// Protocol toggles.
    AltScreenEnter,
    AltScreenLeave,
    BracketedPasteEnable,
    BracketedPasteDisable,

    ClearScreen,
    /// Zero-based absolute cursor move.
    MoveTo { row: usize, col: usize },
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    /// Flush buffered commands to the terminal in one write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let mut buffer = String::new();
        for cmd in self.cmds.drain(..) {
            match cmd {
                TerminalCmd::Bytes(data) => buffer.push_str(&data),
                TerminalCmd::BytesStatic(data) => buffer.push_str(data),
                TerminalCmd::HideCursor => buffer.push_str("\x1b[?25l"),
                TerminalCmd::ShowCursor => buffer.push_str("\x1b[?25h"),
                TerminalCmd::AltScreenEnter => buffer.push_str("\x1b[?1049h"),
                TerminalCmd::AltScreenLeave => buffer.push_str("\x1b[?1049l"),
                TerminalCmd::BracketedPasteEnable => buffer.push_str("\x1b[?2004h"),
                TerminalCmd::BracketedPasteDisable => buffer.push_str("\x1b[?2004l"),
                TerminalCmd::ClearScreen => buffer.push_str("\x1b[2J\x1b[H"),
                TerminalCmd::MoveTo { row, col } => {
                    buffer.push_str(&format!("\x1b[{};{}H", row + 1, col + 1));
                }
            }
        }
        term.write(&buffer);
    }
}
