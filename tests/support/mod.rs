#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use treechat_tui::Terminal;

#[derive(Default)]
struct TerminalState {
    writes: String,
    write_calls: usize,
    columns: u16,
    rows: u16,
    started: bool,
    on_input: Option<Box<dyn FnMut(String) + Send>>,
    on_resize: Option<Box<dyn FnMut() + Send>>,
}

/// In-memory terminal whose handlers can be driven from the test.
#[derive(Clone)]
pub struct HarnessTerminal {
    state: Arc<Mutex<TerminalState>>,
}

impl HarnessTerminal {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(TerminalState {
                columns,
                rows,
                ..TerminalState::default()
            })),
        }
    }

    pub fn take_writes(&self) -> String {
        let mut state = self.state.lock().expect("lock terminal state for writes");
        std::mem::take(&mut state.writes)
    }

    pub fn write_calls(&self) -> usize {
        self.state.lock().expect("lock terminal state").write_calls
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().expect("lock terminal state").started
    }

    pub fn set_size(&self, columns: u16, rows: u16) {
        let mut state = self.state.lock().expect("lock terminal state for resize");
        state.columns = columns;
        state.rows = rows;
    }

    pub fn emit_resize(&self) {
        let mut state = self
            .state
            .lock()
            .expect("lock terminal state for resize callback");
        if let Some(callback) = state.on_resize.as_mut() {
            callback();
        }
    }

    pub fn emit_input(&self, data: &str) {
        let mut state = self
            .state
            .lock()
            .expect("lock terminal state for input callback");
        if let Some(callback) = state.on_input.as_mut() {
            callback(data.to_string());
        }
    }
}

impl Terminal for HarnessTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()> {
        let mut state = self.state.lock().expect("lock terminal state for start");
        state.on_input = Some(on_input);
        state.on_resize = Some(on_resize);
        state.started = true;
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        let mut state = self.state.lock().expect("lock terminal state for stop");
        state.on_input = None;
        state.on_resize = None;
        state.started = false;
        Ok(())
    }

    fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

    fn write(&mut self, data: &str) {
        let mut state = self.state.lock().expect("lock terminal state for write");
        state.writes.push_str(data);
        state.write_calls += 1;
    }

    fn columns(&self) -> u16 {
        self.state.lock().expect("lock terminal state").columns
    }

    fn rows(&self) -> u16 {
        self.state.lock().expect("lock terminal state").rows
    }
}
