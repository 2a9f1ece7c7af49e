//! Process-backed terminal: raw mode on stdin, writes to stdout.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::core::terminal::Terminal;

#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use signal_hook::iterator::Signals;

type InputHandler = Arc<Mutex<Option<Box<dyn FnMut(String) + Send>>>>;
type ResizeHandler = Arc<Mutex<Option<Box<dyn FnMut() + Send>>>>;

const INPUT_POLL_MS: i32 = 50;
const ESCAPE_FLUSH_MS: i32 = 10;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_millis() as u64
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(unix)]
fn write_all_fd(fd: c_int, bytes: &[u8]) -> std::io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let remaining = &bytes[written..];
        let result = unsafe {
            libc::write(
                fd,
                remaining.as_ptr() as *const libc::c_void,
                remaining.len(),
            )
        };
        if result > 0 {
            written += result as usize;
            continue;
        }
        if result == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write returned 0",
            ));
        }

        let err = std::io::Error::last_os_error();
        match err.kind() {
            std::io::ErrorKind::Interrupted => continue,
            std::io::ErrorKind::WouldBlock => {
                poll_fd(fd, libc::POLLOUT, -1);
            }
            _ => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

#[cfg(unix)]
fn poll_fd(fd: c_int, events: libc::c_short, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & events) != 0
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> std::io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> std::io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Accumulates raw stdin bytes and releases complete UTF-8 text.
///
/// A trailing partial escape sequence or partial code point is held back
/// until more bytes arrive or [`PendingInput::flush`] is called.
#[derive(Debug, Default)]
struct PendingInput {
    bytes: Vec<u8>,
}

impl PendingInput {
    fn push(&mut self, data: &[u8]) -> Option<String> {
        self.bytes.extend_from_slice(data);
        let ready = self.ready_len();
        if ready == 0 {
            return None;
        }
        let ready_bytes: Vec<u8> = self.bytes.drain(..ready).collect();
        Some(String::from_utf8_lossy(&ready_bytes).into_owned())
    }

    fn flush(&mut self) -> Option<String> {
        if self.bytes.is_empty() {
            return None;
        }
        let bytes = std::mem::take(&mut self.bytes);
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn has_pending(&self) -> bool {
        !self.bytes.is_empty()
    }

    fn ready_len(&self) -> usize {
        let mut end = match std::str::from_utf8(&self.bytes) {
            Ok(_) => self.bytes.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => self.bytes.len(),
        };

        if let Some(esc) = self.bytes[..end].iter().rposition(|&b| b == 0x1b) {
            let tail = &self.bytes[esc..end];
            let incomplete = match tail.get(1) {
                None => true,
                Some(b'[') => !tail[2..].iter().any(|b| (0x40..=0x7e).contains(b)),
                Some(b'O') => tail.len() < 3,
                Some(_) => false,
            };
            if incomplete {
                end = esc;
            }
        }
        end
    }
}

#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    input_handler: InputHandler,
    resize_handler: ResizeHandler,
    input_thread: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
    drain_mode: Arc<AtomicBool>,
    last_input_time: Arc<AtomicU64>,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
    resize_signal_handle: Option<signal_hook::iterator::Handle>,
    resize_thread: Option<JoinHandle<()>>,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            input_handler: Arc::new(Mutex::new(None)),
            resize_handler: Arc::new(Mutex::new(None)),
            input_thread: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            drain_mode: Arc::new(AtomicBool::new(false)),
            last_input_time: Arc::new(AtomicU64::new(now_ms())),
            write_log_path: None,
            write_log_failed: false,
            resize_signal_handle: None,
            resize_thread: None,
        }
    }

    /// Mirror every write into `path` (append mode) for debugging renders.
    pub fn with_write_log(mut self, path: Option<PathBuf>) -> Self {
        self.write_log_path = path;
        self
    }

    fn enable_raw_mode(&mut self) -> std::io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_raw_mode(&mut self) -> std::io::Result<()> {
        if let Some(original) = self.original_termios.as_ref() {
            set_termios(self.stdin_fd, original)?;
        }
        Ok(())
    }

    fn start_input_thread(&mut self) {
        let stdin_fd = self.stdin_fd;
        let input_handler = Arc::clone(&self.input_handler);
        let stop_flag = Arc::clone(&self.stop_flag);
        let drain_mode = Arc::clone(&self.drain_mode);
        let last_input_time = Arc::clone(&self.last_input_time);

        self.input_thread = Some(thread::spawn(move || {
            let mut buffer = [0u8; 4096];
            let mut pending = PendingInput::default();

            while !stop_flag.load(Ordering::SeqCst) {
                let timeout_ms = if pending.has_pending() {
                    ESCAPE_FLUSH_MS
                } else {
                    INPUT_POLL_MS
                };

                let chunk = if poll_fd(stdin_fd, libc::POLLIN, timeout_ms) {
                    let read_len = unsafe {
                        libc::read(stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len())
                    };
                    if read_len <= 0 {
                        continue;
                    }
                    last_input_time.store(now_ms(), Ordering::SeqCst);
                    pending.push(&buffer[..read_len as usize])
                } else {
                    pending.flush()
                };

                let Some(chunk) = chunk else {
                    continue;
                };
                if drain_mode.load(Ordering::SeqCst) {
                    continue;
                }
                if let Some(handler) = lock_unpoisoned(&input_handler).as_mut() {
                    handler(chunk);
                }
            }
        }));
    }

    fn stop_input_thread(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
    }

    fn start_resize_thread(&mut self) -> std::io::Result<()> {
        let mut signals = Signals::new([libc::SIGWINCH])?;
        let handle = signals.handle();
        let resize_handler = Arc::clone(&self.resize_handler);

        let thread = thread::spawn(move || {
            for _ in signals.forever() {
                if let Some(handler) = lock_unpoisoned(&resize_handler).as_mut() {
                    handler();
                }
            }
        });

        self.resize_signal_handle = Some(handle);
        self.resize_thread = Some(thread);
        Ok(())
    }

    fn stop_resize_thread(&mut self) {
        if let Some(handle) = self.resize_signal_handle.take() {
            handle.close();
        }
        if let Some(thread) = self.resize_thread.take() {
            let _ = thread.join();
        }
    }

    fn clear_handlers(&mut self) {
        *lock_unpoisoned(&self.input_handler) = None;
        *lock_unpoisoned(&self.resize_handler) = None;
    }

    fn append_write_log(&mut self, data: &str) {
        if self.write_log_failed {
            return;
        }
        let Some(path) = self.write_log_path.as_ref() else {
            return;
        };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(data.as_bytes()));
        if let Err(error) = result {
            tracing::warn!(path = %path.display(), %error, "disabling terminal write log");
            self.write_log_failed = true;
        }
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()> {
        *lock_unpoisoned(&self.input_handler) = Some(on_input);
        *lock_unpoisoned(&self.resize_handler) = Some(on_resize);

        self.stop_flag.store(false, Ordering::SeqCst);
        self.drain_mode.store(false, Ordering::SeqCst);
        self.last_input_time.store(now_ms(), Ordering::SeqCst);

        if let Err(err) = self.enable_raw_mode() {
            self.clear_handlers();
            return Err(err);
        }

        if let Err(err) = self.start_resize_thread() {
            self.clear_handlers();
            let _ = self.restore_raw_mode();
            return Err(err);
        }
        unsafe {
            libc::raise(libc::SIGWINCH);
        }

        self.start_input_thread();
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.stop_input_thread();
        self.stop_resize_thread();
        self.clear_handlers();

        // Flush input before leaving raw mode so buffered bytes do not reach the shell.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };

        self.restore_raw_mode()
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        self.drain_mode.store(true, Ordering::SeqCst);
        self.last_input_time.store(now_ms(), Ordering::SeqCst);

        let end_time = now_ms().saturating_add(max_ms);
        loop {
            let now = now_ms();
            if now >= end_time {
                break;
            }
            let last_input = self.last_input_time.load(Ordering::SeqCst);
            if now.saturating_sub(last_input) >= idle_ms {
                break;
            }
            let sleep_for = idle_ms.min(end_time.saturating_sub(now)).max(1);
            thread::sleep(Duration::from_millis(sleep_for));
        }

        self.drain_mode.store(false, Ordering::SeqCst);
    }

    fn write(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        if let Err(error) = write_all_fd(self.stdout_fd, data.as_bytes()) {
            tracing::error!(%error, "terminal write failed");
        }
        self.append_write_log(data);
    }

    fn columns(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(cols, _)| cols)
            .unwrap_or(80)
    }

    fn rows(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(_, rows)| rows)
            .unwrap_or(24)
    }

    fn crash_restorer(&self) -> Option<Box<dyn Fn() + Send + Sync>> {
        let original = self.original_termios?;
        let stdin_fd = self.stdin_fd;
        Some(Box::new(move || {
            let _ = set_termios(stdin_fd, &original);
        }))
    }
}

/// Writes directly to the controlling TTY for crash cleanup.
///
/// Best-effort: never panics, never blocks (the fd is non-blocking), and
/// drops output when no TTY is available.
#[cfg(unix)]
pub(crate) struct HookTerminal {
    fd: c_int,
}

#[cfg(unix)]
impl HookTerminal {
    pub(crate) fn new() -> Self {
        let flags = libc::O_WRONLY | libc::O_NONBLOCK | libc::O_NOCTTY | libc::O_CLOEXEC;
        let fd = unsafe { libc::open(c"/dev/tty".as_ptr(), flags) };
        Self { fd }
    }
}

#[cfg(unix)]
impl Drop for HookTerminal {
    fn drop(&mut self) {
        if self.fd >= 0 {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}

#[cfg(unix)]
impl Terminal for HookTerminal {
    fn start(
        &mut self,
        _on_input: Box<dyn FnMut(String) + Send>,
        _on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

    fn write(&mut self, data: &str) {
        if self.fd < 0 {
            return;
        }
        let _ = unsafe {
            libc::write(self.fd, data.as_ptr() as *const libc::c_void, data.len())
        };
    }

    fn columns(&self) -> u16 {
        80
    }

    fn rows(&self) -> u16 {
        24
    }
}

/// Signal handler guard; dropping it unregisters the handlers.
#[cfg(unix)]
pub struct SignalHookGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

#[cfg(unix)]
impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Install a SIGINT/SIGTERM/SIGHUP hook. `on_signal` runs once, with the
/// signal number.
#[cfg(unix)]
pub fn install_signal_handlers<F>(on_signal: F) -> std::io::Result<SignalHookGuard>
where
    F: Fn(c_int) + Send + Sync + 'static,
{
    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM, libc::SIGHUP])?;
    let handle = signals.handle();
    let ran = AtomicBool::new(false);

    let thread = thread::spawn(move || {
        for signal in signals.forever() {
            if !ran.swap(true, Ordering::SeqCst) {
                on_signal(signal);
            }
        }
    });

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}

type PanicHookFn = dyn Fn(&std::panic::PanicHookInfo) + Send + Sync + 'static;

/// Panic hook guard; dropping it reinstates the hook that was active before.
pub struct PanicHookGuard {
    previous: Option<Arc<Box<PanicHookFn>>>,
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        if thread::panicking() {
            return;
        }
        drop(std::panic::take_hook());
        std::panic::set_hook(Box::new(move |info| (previous)(info)));
    }
}

/// Install a panic hook that runs `cleanup` once, then delegates to the
/// previously installed hook.
pub fn install_panic_hook<F>(cleanup: F) -> PanicHookGuard
where
    F: Fn() + Send + Sync + 'static,
{
    let previous: Arc<Box<PanicHookFn>> = Arc::new(std::panic::take_hook());
    let previous_for_hook = Arc::clone(&previous);
    let ran = AtomicBool::new(false);

    std::panic::set_hook(Box::new(move |info| {
        if !ran.swap(true, Ordering::SeqCst) {
            cleanup();
        }
        (previous_for_hook)(info);
    }));

    PanicHookGuard {
        previous: Some(previous),
    }
}
