//! Centralized logging configuration for the drawing core.
//!
//! The framebuffer paints over the same console that stderr writes to, so
//! diagnostics are off by default and can be redirected to a file that is
//! written by a background thread.
//!
//! Each [`LogCategory`] has its own level; a category left at `Off` follows
//! the global level. Messages are built lazily, so a disabled `log` call costs
//! two atomic loads. Each category may emit at most `get_rate_limit()` lines
//! per second, and suppressed lines are summarized once per second.
//!
//! # Usage
//!
//! ```rust
//! use rawdraw_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Input, LogLevel::Debug, || {
//!     format!("reader for {} exited", "/dev/input/event3")
//! });
//! ```

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

const CATEGORY_COUNT: usize = 3;

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for the core's subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Framebuffer open/map/commit
    Display,
    /// Input device readers and aggregators
    Input,
    /// Frame loop and overlays
    Engine,
}

impl LogCategory {
    pub const ALL: [LogCategory; CATEGORY_COUNT] =
        [LogCategory::Display, LogCategory::Input, LogCategory::Engine];

    fn index(self) -> usize {
        match self {
            LogCategory::Display => 0,
            LogCategory::Input => 1,
            LogCategory::Engine => 2,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Messages a single category sent during the last second.
#[derive(Default)]
struct Budget {
    sent: VecDeque<Instant>,
    suppressed: usize,
    last_notice: Option<Instant>,
}

/// Outcome of asking a [`Budget`] for room.
#[derive(Debug, PartialEq, Eq)]
struct Admission {
    allowed: bool,
    /// Set when a summary of suppressed messages is due.
    suppressed: Option<usize>,
}

const WINDOW: Duration = Duration::from_secs(1);

impl Budget {
    fn admit(&mut self, now: Instant, limit: usize) -> Admission {
        while self
            .sent
            .front()
            .is_some_and(|&at| now.duration_since(at) > WINDOW)
        {
            self.sent.pop_front();
        }

        let allowed = self.sent.len() < limit;
        if allowed {
            self.sent.push_back(now);
        } else {
            self.suppressed += 1;
        }

        let notice_due = self.suppressed > 0
            && (allowed || self.last_notice.map_or(true, |at| now.duration_since(at) >= WINDOW));
        let suppressed = notice_due.then(|| {
            self.last_notice = Some(now);
            std::mem::take(&mut self.suppressed)
        });

        Admission {
            allowed,
            suppressed,
        }
    }
}

/// Per-category message budgets sharing one limit.
struct RateLimiter {
    limit: AtomicUsize,
    budgets: Mutex<[Budget; CATEGORY_COUNT]>,
}

impl RateLimiter {
    fn new(limit: usize) -> Self {
        Self {
            limit: AtomicUsize::new(limit),
            budgets: Mutex::new(Default::default()),
        }
    }

    fn admit(&self, category: LogCategory) -> Admission {
        let limit = self.limit.load(Ordering::Relaxed);
        lock(&self.budgets)[category.index()].admit(Instant::now(), limit)
    }
}

/// Where formatted lines end up.
enum Sink {
    Stderr,
    /// Lines are queued for the writer thread.
    File(Sender<String>),
}

/// Global logging configuration
pub struct LogConfig {
    default_level: AtomicU8,
    levels: [AtomicU8; CATEGORY_COUNT],
    sink: Mutex<Sink>,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    fn new() -> Self {
        Self {
            default_level: AtomicU8::new(LogLevel::Off as u8),
            levels: std::array::from_fn(|_| AtomicU8::new(LogLevel::Off as u8)),
            sink: Mutex::new(Sink::Stderr),
            rate_limiter: RateLimiter::new(60),
        }
    }

    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    /// Level used by every category without its own override.
    pub fn set_global_level(&self, level: LogLevel) {
        self.default_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.default_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category override wins over the global level unless it is Off.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        let threshold = match self.get_level(category) {
            LogLevel::Off => self.get_global_level(),
            own => own,
        };
        level != LogLevel::Off && level <= threshold
    }

    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    /// Messages allowed per category per second.
    pub fn set_rate_limit(&self, max_logs_per_second: usize) {
        self.rate_limiter
            .limit
            .store(max_logs_per_second, Ordering::Relaxed);
    }

    pub fn get_rate_limit(&self) -> usize {
        self.rate_limiter.limit.load(Ordering::Relaxed)
    }

    /// Append log lines to `path` from a background writer thread.
    ///
    /// Replaces any previous log file. The console stays clean for the
    /// framebuffer while this is active.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("rawdraw-log".to_string())
            .spawn(move || {
                for line in receiver {
                    if writeln!(file, "{}", line).and_then(|_| file.flush()).is_err() {
                        break;
                    }
                }
            })?;

        *lock(&self.sink) = Sink::File(sender);
        Ok(())
    }

    /// Send output back to stderr; the writer thread exits once drained.
    pub fn clear_log_file(&self) {
        *lock(&self.sink) = Sink::Stderr;
    }

    fn emit(&self, line: String) {
        let mut sink = lock(&self.sink);
        if let Sink::File(sender) = &*sink {
            match sender.send(line) {
                Ok(()) => return,
                Err(err) => {
                    // Writer thread is gone; fall back for this and later lines.
                    *sink = Sink::Stderr;
                    eprintln!("{}", err.0);
                    return;
                }
            }
        }
        eprintln!("{}", line);
    }
}

/// Log a message with the specified category and level.
///
/// `message_fn` only runs when the category and level are enabled and the
/// category still has room in its per-second budget.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let admission = config.rate_limiter.admit(category);
    if let Some(count) = admission.suppressed {
        config.emit(format!(
            "[{:?}] Warn: rate limit reached, {} message(s) suppressed",
            category, count
        ));
    }
    if admission.allowed {
        config.emit(format!("[{:?}] {:?}: {}", category, level, message_fn()));
    }
}
