use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::log::LogSink;

/// How captured stdout is decoded into a result value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Decode to text (lossily on invalid UTF-8).
    Utf8,
    /// Keep the raw buffer.
    Bytes,
}

/// What happens to the child's stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Capture both streams; captured stdout becomes the result value.
    Piped,
    /// Stream to the parent's stdio; no result value is produced.
    Inherit,
    /// Discard both streams; no result value is produced.
    Null,
}

/// Raw execution options handed through to the process-execution facility.
///
/// Every field is optional so bags can be layered: built-in defaults are
/// overridden by instance-level options, which are overridden by per-call
/// options. Named fields layer wholesale; `env` entries layer per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    pub encoding: Option<Encoding>,
    pub stdio: Option<StdioMode>,
    /// Interpreter override; the platform shell is used when unset.
    pub shell: Option<String>,
    /// Start the child from an empty environment.
    pub clear_env: Option<bool>,
    /// Extra environment variables for the child.
    pub env: BTreeMap<String, String>,
}

impl RawOptions {
    /// Layers `self` over `base`, with `self` winning on overlap.
    pub fn merged_over(&self, base: &Self) -> Self {
        let mut env = base.env.clone();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            encoding: self.encoding.or(base.encoding),
            stdio: self.stdio.or(base.stdio),
            shell: self.shell.clone().or_else(|| base.shell.clone()),
            clear_env: self.clear_env.or(base.clear_env),
            env,
        }
    }
}

/// Fully resolved options for a single shell execution.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    pub encoding: Encoding,
    pub stdio: StdioMode,
    pub shell: Option<String>,
    pub clear_env: bool,
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
}

impl ExecOptions {
    /// Applies the three-layer merge rule: built-in defaults, then the
    /// instance bag, then the per-call bag.
    pub fn resolve(cwd: PathBuf, instance: &RawOptions, call: Option<&RawOptions>) -> Self {
        let merged = match call {
            Some(call) => call.merged_over(instance),
            None => instance.clone(),
        };

        Self {
            encoding: merged.encoding.unwrap_or(Encoding::Utf8),
            stdio: merged.stdio.unwrap_or(StdioMode::Piped),
            shell: merged.shell,
            clear_env: merged.clear_env.unwrap_or(false),
            env: merged.env,
            cwd,
        }
    }
}

/// Options applying to a single `run` call.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Working-directory override, joined onto the runner's base directory.
    pub dir: Option<PathBuf>,
    /// Logged at info before execution, suffixed with an ellipsis.
    pub loading_description: Option<String>,
    /// Logged at info after a successful execution.
    pub finished_description: Option<String>,
    /// Execution-option overrides for this call only.
    pub raw_options: Option<RawOptions>,
    /// Echo the raw result for this call even if the runner is not verbose.
    pub verbose: bool,
}

/// Options for constructing a [`crate::CommandRunner`].
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// Base directory commands run in; defaults to the process cwd.
    pub dir: Option<PathBuf>,
    /// Externally supplied log sink.
    pub log: Option<Arc<dyn LogSink>>,
    /// Default execution options merged into every call.
    pub raw_options: Option<RawOptions>,
    /// Enable verbose logging and raw result echo.
    pub verbose: bool,
}
