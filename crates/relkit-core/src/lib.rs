//! Shell-command invocation with progress logging and normalized errors.
//!
//! This crate defines [`CommandRunner`], a small embeddable component that
//! runs external shell commands (or in-process callables) synchronously,
//! logging human-readable before/after messages and translating every
//! failure into a uniform error while surfacing captured output through
//! the log.

pub mod command;
pub mod error;
mod exec;
pub mod log;
pub mod options;
pub mod runner;

pub use command::{Runnable, RunnerOutput};
pub use error::RunError;
pub use log::{LogLevel, LogSink, TracingLog};
pub use options::{Encoding, RawOptions, RunOptions, RunnerOptions, StdioMode};
pub use runner::CommandRunner;
