mod support;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use support::HarnessTerminal;
use treechat_tui::{
    Command, Component, CursorPos, CustomCommand, CustomCommandCtx, CustomCommandError,
    Focusable, Input, InputEvent, TUI,
};

#[derive(Default)]
struct LogState {
    events: Vec<String>,
    focused: bool,
}

struct EventLog {
    state: Arc<Mutex<LogState>>,
}

impl Component for EventLog {
    fn render(&mut self, _width: usize) -> Vec<String> {
        let state = self.state.lock().expect("log state");
        let mut lines = vec![format!("events: {}", state.events.len())];
        lines.extend(state.events.iter().cloned());
        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        let entry = match event {
            InputEvent::Key { key_id, .. } => format!("key {key_id}"),
            InputEvent::Text { text, .. } => format!("text {text}"),
            InputEvent::Paste { text, .. } => format!("paste {text}"),
            InputEvent::Resize { columns, rows } => format!("resize {columns}x{rows}"),
            InputEvent::UnknownRaw { raw } => format!("raw {raw:?}"),
        };
        self.state.lock().expect("log state").events.push(entry);
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for EventLog {
    fn set_focused(&mut self, focused: bool) {
        self.state.lock().expect("log state").focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.state.lock().expect("log state").focused
    }
}

struct Header;

impl Component for Header {
    fn render(&mut self, _width: usize) -> Vec<String> {
        vec!["header".to_string()]
    }
}

struct PushEvent {
    state: Arc<Mutex<LogState>>,
    entry: &'static str,
}

impl CustomCommand for PushEvent {
    fn name(&self) -> &'static str {
        "push_event"
    }

    fn apply(self: Box<Self>, ctx: &mut CustomCommandCtx) -> Result<(), CustomCommandError> {
        self.state
            .lock()
            .map_err(|_| CustomCommandError::new("poisoned"))?
            .events
            .push(self.entry.to_string());
        ctx.request_render();
        Ok(())
    }
}

fn runtime_with_log(
    terminal: &HarnessTerminal,
) -> (TUI<HarnessTerminal>, Arc<Mutex<LogState>>) {
    let state = Arc::new(Mutex::new(LogState::default()));
    let mut tui = TUI::new(terminal.clone());
    let header = tui.register_component(Header);
    let log = tui.register_component(EventLog {
        state: Arc::clone(&state),
    });
    tui.set_root(vec![header, log]);
    tui.set_focus(log);
    (tui, state)
}

#[test]
fn start_enters_alt_screen_and_stop_restores() {
    let terminal = HarnessTerminal::new(40, 6);
    let (mut tui, state) = runtime_with_log(&terminal);
    assert!(state.lock().expect("log state").focused);

    tui.start().expect("start");
    tui.run_once();
    let writes = terminal.take_writes();
    assert!(writes.starts_with("\x1b[?1049h\x1b[?2004h\x1b[?25l"));
    assert!(writes.contains("header"));
    assert!(writes.contains("events: 0"));

    tui.stop().expect("stop");
    let writes = terminal.take_writes();
    assert!(writes.contains("\x1b[?25h"));
    assert!(writes.contains("\x1b[?2004l"));
    assert!(writes.contains("\x1b[?1049l"));
    assert!(!terminal.is_started());
    assert!(tui.is_stopped());
}

#[test]
fn input_reaches_focused_component_and_rerenders_changed_rows() {
    let terminal = HarnessTerminal::new(40, 6);
    let (mut tui, state) = runtime_with_log(&terminal);
    tui.start().expect("start");
    tui.run_once();
    terminal.take_writes();

    terminal.emit_input("ab\x1b[A");
    tui.run_once();

    assert_eq!(
        state.lock().expect("log state").events,
        vec!["text ab".to_string(), "key up".to_string()]
    );
    let writes = terminal.take_writes();
    assert!(!writes.contains("\x1b[2J"), "partial frame expected: {writes:?}");
    assert!(!writes.contains("header"));
    assert!(writes.contains("events: 2"));
    tui.stop().expect("stop");
}

#[test]
fn each_loop_turn_writes_once() {
    let terminal = HarnessTerminal::new(40, 6);
    let (mut tui, _state) = runtime_with_log(&terminal);
    tui.start().expect("start");
    tui.run_once();
    let before = terminal.write_calls();

    terminal.emit_input("x");
    terminal.emit_input("y");
    tui.run_once();
    assert_eq!(terminal.write_calls(), before + 1);

    tui.run_once();
    assert_eq!(terminal.write_calls(), before + 1);
    tui.stop().expect("stop");
}

#[test]
fn resize_forces_full_redraw_and_notifies_focus() {
    let terminal = HarnessTerminal::new(40, 6);
    let (mut tui, state) = runtime_with_log(&terminal);
    tui.start().expect("start");
    tui.run_once();
    terminal.take_writes();

    terminal.set_size(30, 5);
    terminal.emit_resize();
    tui.run_once();

    assert_eq!(
        state.lock().expect("log state").events,
        vec!["resize 30x5".to_string()]
    );
    assert!(terminal.take_writes().contains("\x1b[2J"));
    tui.stop().expect("stop");
}

#[test]
fn custom_command_from_worker_thread_wakes_runtime() {
    let terminal = HarnessTerminal::new(40, 6);
    let (mut tui, state) = runtime_with_log(&terminal);
    tui.start().expect("start");
    tui.run_once();

    let handle = tui.runtime_handle();
    let worker_state = Arc::clone(&state);
    let worker = thread::spawn(move || {
        handle.dispatch(Command::Custom(Box::new(PushEvent {
            state: worker_state,
            entry: "from worker",
        })));
    });
    worker.join().expect("worker");

    tui.run_with_timeout(Duration::from_secs(2));
    assert_eq!(
        state.lock().expect("log state").events,
        vec!["from worker".to_string()]
    );
    assert!(terminal.take_writes().contains("from worker"));
    tui.stop().expect("stop");
}

#[test]
fn request_stop_is_visible_to_the_loop() {
    let terminal = HarnessTerminal::new(40, 6);
    let (mut tui, _state) = runtime_with_log(&terminal);
    tui.start().expect("start");
    assert!(!tui.stop_requested());

    tui.runtime_handle().dispatch(Command::RequestStop);
    tui.run_once();
    assert!(tui.stop_requested());
    tui.stop().expect("stop");
}

#[test]
fn focused_input_places_hardware_cursor() {
    let terminal = HarnessTerminal::new(20, 3);
    let mut tui = TUI::new(terminal.clone());
    let header = tui.register_component(Header);
    let input = tui.register_component(Input::new());
    tui.set_root(vec![header, input]);
    tui.set_focus(input);
    tui.start().expect("start");
    tui.run_once();
    terminal.take_writes();

    terminal.emit_input("hey");
    tui.run_once();
    let writes = terminal.take_writes();
    let cursor = CursorPos { row: 1, col: 5 };
    assert!(
        writes.ends_with(&format!("\x1b[{};{}H\x1b[?25h", cursor.row + 1, cursor.col + 1)),
        "cursor move missing: {writes:?}"
    );
    tui.stop().expect("stop");
}
