//! TUI runtime: input dispatch, command queue, and frame rendering.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::core::component::{Component, CursorPos};
use crate::core::input_event::{parse_input_events, InputEvent};
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::Terminal;
use crate::render::renderer::ScreenRenderer;
use crate::runtime::component_registry::{ComponentId, ComponentRegistry};

const STOP_DRAIN_MAX_MS: u64 = 1000;
const STOP_DRAIN_IDLE_MS: u64 = 50;

/// Work a background thread can hand to the runtime thread.
pub enum Command {
    RequestRender,
    RequestStop,
    Custom(Box<dyn CustomCommand>),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestRender => f.write_str("RequestRender"),
            Self::RequestStop => f.write_str("RequestStop"),
            Self::Custom(command) => write!(f, "Custom({})", command.name()),
        }
    }
}

/// Deferred work executed on the runtime thread between input and render.
pub trait CustomCommand: Send {
    fn name(&self) -> &'static str;

    fn apply(self: Box<Self>, ctx: &mut CustomCommandCtx) -> Result<(), CustomCommandError>;
}

/// Runtime access granted to a [`CustomCommand`].
#[derive(Debug, Default)]
pub struct CustomCommandCtx {
    render_requested: bool,
    stop_requested: bool,
}

impl CustomCommandCtx {
    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomCommandError {
    message: String,
}

impl CustomCommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CustomCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CustomCommandError {}

#[derive(Default)]
struct RuntimeWakeState {
    pending_inputs: Vec<String>,
    pending_resize: bool,
    render_requested: bool,
    commands: VecDeque<Command>,
    stop_requested: bool,
}

impl RuntimeWakeState {
    fn has_work(&self) -> bool {
        !self.pending_inputs.is_empty()
            || self.pending_resize
            || self.render_requested
            || !self.commands.is_empty()
    }
}

#[derive(Default)]
struct RuntimeWake {
    state: Mutex<RuntimeWakeState>,
    cvar: Condvar,
}

impl RuntimeWake {
    fn lock(&self) -> MutexGuard<'_, RuntimeWakeState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut RuntimeWakeState)) {
        let mut state = self.lock();
        apply(&mut state);
        self.cvar.notify_all();
    }

    /// Blocks until work is queued or a stop was requested.
    fn wait_for_event(&self, timeout: Option<Duration>) -> bool {
        let mut state = self.lock();
        while !state.stop_requested && !state.has_work() {
            state = match timeout {
                Some(timeout) => {
                    let (state, result) = self
                        .cvar
                        .wait_timeout(state, timeout)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    if result.timed_out() {
                        return false;
                    }
                    state
                }
                None => self
                    .cvar
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            };
        }
        !state.stop_requested
    }

    fn take_inputs(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().pending_inputs)
    }

    fn take_resize(&self) -> bool {
        std::mem::take(&mut self.lock().pending_resize)
    }

    fn take_commands(&self) -> VecDeque<Command> {
        std::mem::take(&mut self.lock().commands)
    }

    fn take_render_requested(&self) -> bool {
        std::mem::take(&mut self.lock().render_requested)
    }

    fn stop_requested(&self) -> bool {
        self.lock().stop_requested
    }

    fn reset_for_start(&self) {
        *self.lock() = RuntimeWakeState::default();
    }
}

/// Cloneable, `Send` handle for dispatching [`Command`]s to a running runtime.
#[derive(Clone)]
pub struct RuntimeHandle {
    wake: Arc<RuntimeWake>,
}

impl RuntimeHandle {
    pub fn dispatch(&self, command: Command) {
        self.wake.update(|state| match command {
            Command::RequestRender => state.render_requested = true,
            Command::RequestStop => state.stop_requested = true,
            command @ Command::Custom(_) => state.commands.push_back(command),
        });
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct CrashCleanup {
    ran: AtomicBool,
    restore_mode: Option<Box<dyn Fn() + Send + Sync>>,
}

impl CrashCleanup {
    fn commands() -> [TerminalCmd; 3] {
        [
            TerminalCmd::ShowCursor,
            TerminalCmd::BracketedPasteDisable,
            TerminalCmd::AltScreenLeave,
        ]
    }

    fn run<T: Terminal + ?Sized>(&self, terminal: &mut T) {
        if self.ran.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut output = OutputGate::new();
        output.extend(Self::commands());
        output.flush(terminal);
        if let Some(restore_mode) = self.restore_mode.as_ref() {
            restore_mode();
        }
    }

    #[cfg(all(unix, not(test)))]
    fn run_best_effort(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut terminal = crate::platform::process_terminal::HookTerminal::new();
            self.run(&mut terminal);
        }));
    }
}

pub struct TuiRuntime<T: Terminal> {
    terminal: T,
    output: OutputGate,
    renderer: ScreenRenderer,
    components: ComponentRegistry,
    root: Vec<ComponentId>,
    focus: Option<ComponentId>,
    wake: Arc<RuntimeWake>,
    last_cursor: Option<CursorPos>,
    stopped: bool,
    #[cfg(all(unix, not(test)))]
    signal_hook_guard: Option<crate::platform::SignalHookGuard>,
    #[cfg(all(unix, not(test)))]
    panic_hook_guard: Option<crate::platform::PanicHookGuard>,
}

impl<T: Terminal> TuiRuntime<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            output: OutputGate::new(),
            renderer: ScreenRenderer::new(),
            components: ComponentRegistry::new(),
            root: Vec::new(),
            focus: None,
            wake: Arc::new(RuntimeWake::default()),
            last_cursor: None,
            stopped: true,
            #[cfg(all(unix, not(test)))]
            signal_hook_guard: None,
            #[cfg(all(unix, not(test)))]
            panic_hook_guard: None,
        }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            wake: Arc::clone(&self.wake),
        }
    }

    pub fn register_component<C: Component + 'static>(&mut self, component: C) -> ComponentId {
        self.components.register_boxed(Box::new(component))
    }

    /// Components rendered top to bottom, in order.
    pub fn set_root(&mut self, root: Vec<ComponentId>) {
        self.root = root;
        self.wake.update(|state| state.render_requested = true);
    }

    pub fn set_focus(&mut self, id: ComponentId) {
        if let Some(previous) = self.focus.take() {
            if let Some(focusable) = self
                .components
                .get_mut(previous)
                .and_then(|component| component.as_focusable())
            {
                focusable.set_focused(false);
            }
        }
        if let Some(focusable) = self
            .components
            .get_mut(id)
            .and_then(|component| component.as_focusable())
        {
            focusable.set_focused(true);
        }
        self.focus = Some(id);
    }

    #[cfg(test)]
    pub(crate) fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether a [`Command::RequestStop`] has been dispatched since `start`.
    pub fn stop_requested(&self) -> bool {
        self.wake.stop_requested()
    }

    pub fn start(&mut self) -> io::Result<()> {
        self.output.clear();
        self.wake.reset_for_start();
        self.renderer.request_full_redraw_next();
        self.last_cursor = None;

        let wake_input = Arc::clone(&self.wake);
        let wake_resize = Arc::clone(&self.wake);
        self.terminal.start(
            Box::new(move |data| wake_input.update(|state| state.pending_inputs.push(data))),
            Box::new(move || wake_resize.update(|state| state.pending_resize = true)),
        )?;
        self.stopped = false;

        #[cfg(all(unix, not(test)))]
        self.install_cleanup_hooks()?;

        self.output.push(TerminalCmd::AltScreenEnter);
        self.output.push(TerminalCmd::BracketedPasteEnable);
        self.output.push(TerminalCmd::HideCursor);
        self.flush_output();
        self.wake.update(|state| state.render_requested = true);

        tracing::info!(
            columns = self.terminal.columns(),
            rows = self.terminal.rows(),
            "terminal runtime started"
        );
        Ok(())
    }

    pub fn stop(&mut self) -> io::Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.wake.update(|state| state.stop_requested = true);
        self.output.extend(CrashCleanup::commands());
        self.flush_output();
        self.terminal
            .drain_input(STOP_DRAIN_MAX_MS, STOP_DRAIN_IDLE_MS);
        let result = self.terminal.stop();
        self.stopped = true;

        #[cfg(all(unix, not(test)))]
        self.uninstall_cleanup_hooks();

        tracing::info!("terminal runtime stopped");
        result
    }

    #[cfg(all(unix, not(test)))]
    fn install_cleanup_hooks(&mut self) -> io::Result<()> {
        let cleanup = Arc::new(CrashCleanup {
            ran: AtomicBool::new(false),
            restore_mode: self.terminal.crash_restorer(),
        });
        let signal_cleanup = Arc::clone(&cleanup);
        let panic_cleanup = Arc::clone(&cleanup);

        self.signal_hook_guard = Some(crate::platform::install_signal_handlers(
            move |signal| {
                signal_cleanup.run_best_effort();
                std::process::exit(128 + signal);
            },
        )?);
        self.panic_hook_guard = Some(crate::platform::install_panic_hook(move || {
            panic_cleanup.run_best_effort()
        }));
        Ok(())
    }

    #[cfg(all(unix, not(test)))]
    fn uninstall_cleanup_hooks(&mut self) {
        self.signal_hook_guard = None;
        self.panic_hook_guard = None;
    }

    /// Blocks until input, a resize, or a command arrives, then processes
    /// everything queued and renders once if anything asked for it.
    pub fn run_blocking_once(&mut self) {
        if self.stopped {
            return;
        }
        if self.wake.wait_for_event(None) {
            self.run_once();
        }
    }

    /// Like [`TuiRuntime::run_blocking_once`], giving up after `timeout`.
    pub fn run_with_timeout(&mut self, timeout: Duration) {
        if self.stopped {
            return;
        }
        if self.wake.wait_for_event(Some(timeout)) {
            self.run_once();
        }
    }

    /// Processes queued work without blocking.
    pub fn run_once(&mut self) {
        if self.stopped {
            return;
        }

        if self.wake.take_resize() {
            self.renderer.request_full_redraw_next();
            let event = InputEvent::Resize {
                columns: self.terminal.columns(),
                rows: self.terminal.rows(),
            };
            self.dispatch_event(&event);
            self.request_render();
        }

        for data in self.wake.take_inputs() {
            self.handle_input(&data);
        }

        for command in self.wake.take_commands() {
            self.apply_command(command);
        }

        if self.wake.take_render_requested() {
            self.do_render();
        }
        self.flush_output();
    }

    /// Parses raw terminal input and delivers the events to the focused component.
    pub fn handle_input(&mut self, data: &str) {
        let events = parse_input_events(data);
        if events.is_empty() {
            return;
        }
        for event in &events {
            self.dispatch_event(event);
        }
        self.request_render();
    }

    pub fn request_render(&mut self) {
        self.wake.update(|state| state.render_requested = true);
    }

    fn dispatch_event(&mut self, event: &InputEvent) {
        let Some(focus) = self.focus else {
            return;
        };
        if let Some(component) = self.components.get_mut(focus) {
            component.handle_event(event);
        }
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::RequestRender => self.request_render(),
            Command::RequestStop => self.wake.update(|state| state.stop_requested = true),
            Command::Custom(command) => {
                let name = command.name();
                let mut ctx = CustomCommandCtx::default();
                if let Err(error) = command.apply(&mut ctx) {
                    tracing::warn!(command = name, %error, "custom command failed");
                }
                if ctx.render_requested {
                    self.request_render();
                }
                if ctx.stop_requested {
                    self.wake.update(|state| state.stop_requested = true);
                }
            }
        }
    }

    fn do_render(&mut self) {
        let width = self.terminal.columns() as usize;
        let height = self.terminal.rows() as usize;

        let mut lines = Vec::new();
        let mut cursor = None;
        for id in self.root.clone() {
            let Some(component) = self.components.get_mut(id) else {
                continue;
            };
            component.set_terminal_rows(height);
            let offset = lines.len();
            lines.extend(component.render(width));
            if Some(id) == self.focus {
                cursor = component.cursor_pos().map(|pos| CursorPos {
                    row: pos.row + offset,
                    col: pos.col.min(width.saturating_sub(1)),
                });
            }
        }
        let cursor = cursor.filter(|pos| pos.row < height);

        let frame_cmds = self.renderer.render(lines, width, height);
        let frame_changed = !frame_cmds.is_empty();
        self.output.extend(frame_cmds);

        if frame_changed || cursor != self.last_cursor {
            match cursor {
                Some(CursorPos { row, col }) => {
                    self.output.push(TerminalCmd::MoveTo { row, col });
                    self.output.push(TerminalCmd::ShowCursor);
                }
                None => self.output.push(TerminalCmd::HideCursor),
            }
            self.last_cursor = cursor;
        }
    }

    fn flush_output(&mut self) {
        self.output.flush(&mut self.terminal);
    }
}

impl<T: Terminal> Drop for TuiRuntime<T> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = self.stop();
        }));
    }
}
