//! 日志模块：注入式日志能力（默认转发到 tracing）。
//!
//! # Logging
//!
//! The client never reaches for a process-wide logger. A [`Logger`] is handed
//! to the [`ClientBuilder`](crate::ClientBuilder) and every dispatcher line
//! goes through it. The default [`TracingLogger`] forwards to `tracing`
//! events under the `ollama_lib_rust` target; installing a subscriber is up to
//! the application.
//!
//! | Logger | Behaviour |
//! |--------|-----------|
//! | [`TracingLogger`] | Emits `tracing` events (default) |
//! | [`NoopLogger`] | Discards everything |
//! | [`InMemoryLogger`] | Keeps the last N records, for tests and diagnostics |

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Logging capability injected into the client.
///
/// Lines are for observability only; nothing in the crate parses them.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn error(&self, message: &str);

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => self.debug(message),
            LogLevel::Info => self.info(message),
            LogLevel::Error => self.error(message),
        }
    }
}

/// Forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "ollama_lib_rust", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "ollama_lib_rust", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "ollama_lib_rust", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// One captured line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// In-memory logger for testing. Oldest records are evicted past `max_records`.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the client.
#[derive(Debug, Clone)]
pub struct InMemoryLogger {
    records: Arc<Mutex<VecDeque<LogRecord>>>,
    max_records: usize,
}

impl InMemoryLogger {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::new())),
            max_records: max_records.max(1),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().cloned().collect()
    }

    /// Messages at `level`, oldest first.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|r| r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<LogRecord>> {
        // a panicking writer cannot leave a half-pushed record behind
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, level: LogLevel, message: &str) {
        let mut records = self.lock();
        records.push_back(LogRecord {
            level,
            message: message.to_string(),
        });
        while records.len() > self.max_records {
            records.pop_front();
        }
    }
}

impl Default for InMemoryLogger {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Logger for InMemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

/// Default logger used when none is configured.
pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}

/// Install a `tracing-subscriber` fmt layer filtered by `RUST_LOG`, falling
/// back to `default_directive` (e.g. `"ollama_lib_rust=debug"`).
///
/// Meant for binaries and demos. Returns `false` if a global subscriber was
/// already set.
pub fn init_tracing(default_directive: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
