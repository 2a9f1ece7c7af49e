//! Terminal trait.

/// Minimal terminal interface for the runtime.
pub trait Terminal {
    /// Start the terminal with input and resize handlers.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()>;

    /// Stop the terminal and restore the previous mode.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Discard pending input for up to `max_ms`, returning early once the
    /// stream has been idle for `idle_ms`.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64);

    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Terminal dimensions.
    fn columns(&self) -> u16;
    fn rows(&self) -> u16;

    /// Callback that restores the terminal mode from a signal or panic
    /// context, when the terminal changed it on `start`.
    fn crash_restorer(&self) -> Option<Box<dyn Fn() + Send + Sync>> {
        None
    }
}
