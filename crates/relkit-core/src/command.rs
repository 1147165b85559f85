use std::fmt::{self, Display, Formatter};

use anyhow::Result;

/// A result value produced by a runnable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerOutput {
    Text(String),
    Bytes(Vec<u8>),
}

impl RunnerOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// The output as text, decoding byte output lossily.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl Display for RunnerOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

type CallableFn = Box<dyn FnOnce() -> Result<Option<RunnerOutput>> + Send>;

/// A runnable command: a shell command line, or a zero-argument function
/// invoked in-process instead of spawning a subprocess.
pub enum Runnable {
    Shell(String),
    Callable(CallableFn),
}

impl Runnable {
    pub fn callable<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Option<RunnerOutput>> + Send + 'static,
    {
        Self::Callable(Box::new(f))
    }
}

impl From<&str> for Runnable {
    fn from(cmd: &str) -> Self {
        Self::Shell(cmd.to_string())
    }
}

impl From<String> for Runnable {
    fn from(cmd: String) -> Self {
        Self::Shell(cmd)
    }
}

impl fmt::Debug for Runnable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell(cmd) => f.debug_tuple("Shell").field(cmd).finish(),
            Self::Callable(_) => f.debug_tuple("Callable").finish(),
        }
    }
}
