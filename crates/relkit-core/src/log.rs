use std::fmt::Debug;

/// Ordered detail levels for a [`LogSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

/// A contract for anything the runner can log through.
///
/// The runner depends only on this interface, never on a concrete logging
/// implementation, so callers can inject their own sink (a test recorder,
/// an adapter over an existing logger, ...).
pub trait LogSink: Send + Sync + Debug {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink forwarding to the `tracing` macros, gated by a level.
#[derive(Debug)]
pub struct TracingLog {
    level: LogLevel,
}

impl TracingLog {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn enabled(&self, at: LogLevel) -> bool {
        at >= self.level
    }
}

impl LogSink for TracingLog {
    fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Debug) {
            tracing::debug!("{message}");
        }
    }

    fn info(&self, message: &str) {
        if self.enabled(LogLevel::Info) {
            tracing::info!("{message}");
        }
    }

    fn error(&self, message: &str) {
        if self.enabled(LogLevel::Error) {
            tracing::error!("{message}");
        }
    }
}
