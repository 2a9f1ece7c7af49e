//! Full-screen line diff renderer.
//!
//! Frames are exactly `height` rows. The first frame (and any frame after a
//! resize or an explicit invalidation) repaints everything; later frames
//! rewrite only rows whose text changed.

use crate::core::output::TerminalCmd;
use crate::core::text::utils::truncate_to_width;
use crate::core::text::width::visible_width;

const LINE_RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\x1b[2K";
const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";

#[derive(Debug, Default)]
pub struct ScreenRenderer {
    previous_lines: Vec<String>,
    previous_size: Option<(usize, usize)>,
    force_full_redraw_next: bool,
}

impl ScreenRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_full_redraw_next(&mut self) {
        self.force_full_redraw_next = true;
    }

    /// Rows as last written to the terminal.
    pub fn previous_lines(&self) -> &[String] {
        &self.previous_lines
    }

    pub fn render(&mut self, lines: Vec<String>, width: usize, height: usize) -> Vec<TerminalCmd> {
        let frame = fit_to_screen(lines, width, height);
        let force_full = std::mem::take(&mut self.force_full_redraw_next);
        let size_changed = self.previous_size != Some((width, height));

        let mut cmds = Vec::new();
        if force_full || size_changed || self.previous_lines.is_empty() {
            tracing::trace!(width, height, "full redraw");
            cmds.push(TerminalCmd::BytesStatic(SYNC_START));
            cmds.push(TerminalCmd::ClearScreen);
            for (row, line) in frame.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                cmds.push(TerminalCmd::MoveTo { row, col: 0 });
                cmds.push(TerminalCmd::bytes(with_reset(line)));
            }
            cmds.push(TerminalCmd::BytesStatic(SYNC_END));
        } else {
            let changed: Vec<usize> = (0..height)
                .filter(|&row| self.previous_lines.get(row) != frame.get(row))
                .collect();
            if !changed.is_empty() {
                cmds.push(TerminalCmd::BytesStatic(SYNC_START));
                for row in changed {
                    cmds.push(TerminalCmd::MoveTo { row, col: 0 });
                    cmds.push(TerminalCmd::BytesStatic(CLEAR_LINE));
                    if !frame[row].is_empty() {
                        cmds.push(TerminalCmd::bytes(with_reset(&frame[row])));
                    }
                }
                cmds.push(TerminalCmd::BytesStatic(SYNC_END));
            }
        }

        self.previous_lines = frame;
        self.previous_size = Some((width, height));
        cmds
    }
}

/// Clips to `height` rows and `width` columns, padding with empty rows.
fn fit_to_screen(mut lines: Vec<String>, width: usize, height: usize) -> Vec<String> {
    lines.truncate(height);
    for line in lines.iter_mut() {
        if visible_width(line) > width {
            *line = truncate_to_width(line, width, "");
        }
    }
    lines.resize(height, String::new());
    lines
}

fn with_reset(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + LINE_RESET.len());
    out.push_str(line);
    out.push_str(LINE_RESET);
    out
}

#[cfg(test)]
mod tests {
    use super::ScreenRenderer;
    use crate::core::output::TerminalCmd;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn first_frame_is_a_full_redraw() {
        let mut renderer = ScreenRenderer::new();
        let cmds = renderer.render(lines(&["a", "b"]), 10, 3);
        assert!(cmds.contains(&TerminalCmd::ClearScreen));
        assert_eq!(renderer.previous_lines(), &lines(&["a", "b", ""])[..]);
    }

    #[test]
    fn unchanged_frame_emits_nothing() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(lines(&["a", "b"]), 10, 2);
        assert!(renderer.render(lines(&["a", "b"]), 10, 2).is_empty());
    }

    #[test]
    fn only_changed_rows_are_rewritten() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(lines(&["a", "b", "c"]), 10, 3);
        let cmds = renderer.render(lines(&["a", "B", "c"]), 10, 3);

        assert!(!cmds.contains(&TerminalCmd::ClearScreen));
        let moves: Vec<_> = cmds
            .iter()
            .filter(|cmd| matches!(cmd, TerminalCmd::MoveTo { .. }))
            .collect();
        assert_eq!(moves, vec![&TerminalCmd::MoveTo { row: 1, col: 0 }]);
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(lines(&["a"]), 10, 2);
        let cmds = renderer.render(lines(&["a"]), 12, 2);
        assert!(cmds.contains(&TerminalCmd::ClearScreen));
    }

    #[test]
    fn overflowing_rows_and_columns_are_clipped() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(lines(&["abcdef", "2", "3"]), 4, 2);
        assert_eq!(renderer.previous_lines(), &lines(&["abcd\x1b[0m", "2"])[..]);
    }
}
