use std::sync::{Arc, Mutex};

use chat_provider::ProviderProfile;
use chat_tree::{render as render_tree, role_label, format_time_of_day, Direction, DisplayLine};
use treechat_tui::{
    truncate_to_width, wrap_text, Component, CursorPos, Focusable, Input, InputEvent,
};

use crate::app::{App, Focus, HostOps, Mode};
use crate::runtime::{lock_unpoisoned, RuntimeController};

const DETAIL_MAX_ROWS: usize = 6;
/// Header, two separators, status line and input line.
const CHROME_ROWS: usize = 5;
const DEFAULT_ROWS: usize = 24;

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

pub struct AppComponent {
    app: Arc<Mutex<App>>,
    host: Arc<RuntimeController>,
    provider_profile: ProviderProfile,
    input: Input,
    focused: bool,
    terminal_rows: usize,
    tree_scroll: usize,
    cursor_pos: Option<CursorPos>,
}

impl AppComponent {
    pub fn new(
        app: Arc<Mutex<App>>,
        host: Arc<RuntimeController>,
        provider_profile: ProviderProfile,
    ) -> Self {
        let app_for_submit = Arc::clone(&app);
        let host_for_submit = Arc::clone(&host);

        let mut input = Input::new();
        input.set_on_submit(Some(Box::new(move |value| {
            let mut app = lock_unpoisoned(&app_for_submit);
            app.on_input_replace(value);

            let mut host = Arc::clone(&host_for_submit);
            app.on_submit(&mut host);
        })));

        Self {
            app,
            host,
            provider_profile,
            input,
            focused: false,
            terminal_rows: DEFAULT_ROWS,
            tree_scroll: 0,
            cursor_pos: None,
        }
    }

    fn with_app_mut(&self, mut f: impl FnMut(&mut App, &mut dyn HostOps)) {
        let mut app = lock_unpoisoned(&self.app);
        let mut host = Arc::clone(&self.host);
        f(&mut app, &mut host);
    }

    fn sync_input_from_app(&mut self) {
        let text = lock_unpoisoned(&self.app).input.clone();
        if self.input.value() != text {
            self.input.set_value(text);
        }
    }

    fn forward_to_input(&mut self, event: &InputEvent) {
        let before = self.input.value().to_string();
        self.input.handle_event(event);

        if matches!(event, InputEvent::Key { key_id, .. } if key_id == "enter") {
            self.sync_input_from_app();
            return;
        }

        if self.input.value() != before {
            let value = self.input.value().to_string();
            self.with_app_mut(|app, host| {
                app.on_input_replace(value.clone());
                host.request_render();
            });
        }
    }

    fn handle_tree_char(&mut self, ch: char) {
        match ch {
            'q' => self.with_app_mut(|app, host| app.on_quit(host)),
            'e' => self.with_app_mut(|app, host| app.on_edit_selected(host)),
            'n' => self.with_app_mut(|app, host| app.on_new_conversation(host)),
            'i' => self.with_app_mut(|app, host| app.on_toggle_focus(host)),
            'h' | 'j' | 'k' | 'l' => {
                if let Ok(direction) = ch.to_string().parse::<Direction>() {
                    self.with_app_mut(|app, host| app.on_navigate(direction, host));
                }
            }
            _ => {}
        }
    }

    fn handle_tree_key(&mut self, key_id: &str) {
        match key_id {
            "up" | "down" | "left" | "right" => {
                if let Ok(direction) = key_id.parse::<Direction>() {
                    self.with_app_mut(|app, host| app.on_navigate(direction, host));
                }
            }
            "enter" => self.with_app_mut(|app, host| app.on_edit_selected(host)),
            _ => {}
        }
    }
}

impl Component for AppComponent {
    fn render(&mut self, width: usize) -> Vec<String> {
        self.sync_input_from_app();

        let app = lock_unpoisoned(&self.app);
        let tree_lines = render_tree(&app.tree);
        let detail = render_detail_lines(&app, width);
        let tree_rows = self
            .terminal_rows
            .saturating_sub(CHROME_ROWS + detail.len())
            .max(1);

        let selected_index = tree_lines.iter().position(|line| line.selected);
        self.tree_scroll = scroll_to_show(self.tree_scroll, selected_index, tree_rows, tree_lines.len());

        let mut lines = Vec::with_capacity(self.terminal_rows);
        lines.push(render_header(&app, &self.provider_profile));
        lines.extend(visible_tree_lines(&tree_lines, self.tree_scroll, tree_rows, width));
        lines.push(separator_line(width));
        lines.extend(detail);
        lines.push(separator_line(width));
        lines.push(render_status_line(&app, &self.provider_profile));

        let input_focused = self.focused && app.focus == Focus::Input;
        let prompt = match app.editing {
            Some(id) => format!("edit #{id:04}> "),
            None => "> ".to_string(),
        };
        drop(app);

        self.input.set_prompt(prompt);
        self.input.set_focused(input_focused);
        let input_row = lines.len();
        lines.extend(self.input.render(width));
        self.cursor_pos = self.input.cursor_pos().map(|pos| CursorPos {
            row: pos.row + input_row,
            col: pos.col,
        });

        lines
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        self.cursor_pos
    }

    fn set_terminal_rows(&mut self, rows: usize) {
        self.terminal_rows = rows;
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn handle_event(&mut self, event: &InputEvent) {
        let focus = lock_unpoisoned(&self.app).focus;

        match event {
            InputEvent::Key { key_id, .. } => match key_id.as_str() {
                "escape" | "ctrl+c" => self.with_app_mut(|app, host| app.on_quit(host)),
                "tab" => self.with_app_mut(|app, host| app.on_toggle_focus(host)),
                _ if focus == Focus::Tree => {
                    self.handle_tree_key(key_id);
                    self.sync_input_from_app();
                }
                _ => self.forward_to_input(event),
            },
            InputEvent::Text { text, .. } if focus == Focus::Tree => {
                for ch in text.chars() {
                    self.handle_tree_char(ch);
                    if lock_unpoisoned(&self.app).focus != Focus::Tree {
                        break;
                    }
                }
                self.sync_input_from_app();
            }
            InputEvent::Text { .. } | InputEvent::Paste { .. } if focus == Focus::Input => {
                self.forward_to_input(event);
            }
            InputEvent::Resize { .. } => {
                let mut host = Arc::clone(&self.host);
                host.request_render();
            }
            _ => {}
        }
    }
}

impl Focusable for AppComponent {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

fn render_header(app: &App, profile: &ProviderProfile) -> String {
    let focus = match app.focus {
        Focus::Tree => "tree",
        Focus::Input => "input",
    };
    format!(
        "{} {} {}",
        bold("treechat"),
        dim(&format!("{}/{}", profile.provider_id, profile.model_id)),
        dim(&format!("[{focus}]"))
    )
}

fn render_status_line(app: &App, profile: &ProviderProfile) -> String {
    let mode = match app.mode {
        Mode::Idle => "idle".to_string(),
        Mode::Requesting { parent_id, .. } => {
            format!("waiting... ({} reply to #{parent_id:04})", profile.model_id)
        }
    };

    match app.status.as_deref() {
        Some(status) => format!("{mode} {} {status}", dim("|")),
        None => mode,
    }
}

/// Selected node header plus its wrapped content, capped in height.
fn render_detail_lines(app: &App, width: usize) -> Vec<String> {
    let Some(node) = app.tree.selected() else {
        return vec![dim("(no selection; the next message starts a new conversation)")];
    };

    let mut lines = vec![dim(&format!(
        "#{:04} {} {}",
        node.id,
        role_label(node.role).trim_end(),
        format_time_of_day(node.timestamp)
    ))];
    let body = wrap_text(&node.content, width.max(1));
    let cap = DETAIL_MAX_ROWS.saturating_sub(1);
    let overflow = body.len() > cap;
    lines.extend(body.into_iter().take(cap));
    if overflow {
        if let Some(last) = lines.last_mut() {
            *last = truncate_to_width(last, width.saturating_sub(3), "...");
        }
    }
    lines
}

fn visible_tree_lines(
    tree_lines: &[DisplayLine],
    scroll: usize,
    rows: usize,
    width: usize,
) -> Vec<String> {
    let mut visible: Vec<String> = tree_lines
        .iter()
        .skip(scroll)
        .take(rows)
        .map(|line| truncate_to_width(&line.text, width, "..."))
        .collect();
    visible.resize(rows, String::new());
    visible
}

/// Smallest scroll change that keeps `selected` inside a window of `rows`.
fn scroll_to_show(scroll: usize, selected: Option<usize>, rows: usize, total: usize) -> usize {
    let max_scroll = total.saturating_sub(rows);
    let scroll = match selected {
        Some(index) if index < scroll => index,
        Some(index) if index >= scroll + rows => index + 1 - rows,
        _ => scroll,
    };
    scroll.min(max_scroll)
}

fn separator_line(width: usize) -> String {
    dim(&"─".repeat(width))
}
