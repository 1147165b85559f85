use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use crate::command::RunnerOutput;
use crate::options::{Encoding, ExecOptions, StdioMode};

/// Failure raised by the process-execution facility.
#[derive(Debug, Error)]
pub enum ExecFailure {
    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] io::Error),
    #[error("command exited with {status}")]
    NonZero {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
}

impl ExecFailure {
    /// Captured stdout as text, if any was captured and non-empty.
    pub fn stdout_text(&self) -> Option<String> {
        match self {
            Self::NonZero { stdout, .. } if !stdout.is_empty() => {
                Some(String::from_utf8_lossy(stdout).into_owned())
            }
            _ => None,
        }
    }

    /// Captured stderr as text, if any was captured and non-empty.
    pub fn stderr_text(&self) -> Option<String> {
        match self {
            Self::NonZero { stderr, .. } if !stderr.is_empty() => {
                Some(String::from_utf8_lossy(stderr).into_owned())
            }
            _ => None,
        }
    }
}

/// Synchronously runs `command` through a shell with the resolved options.
///
/// Blocks until the child exits. In `Piped` mode the captured stdout becomes
/// the result value; in `Inherit`/`Null` mode no value is produced.
pub(crate) fn shell(command: &str, opts: &ExecOptions) -> Result<Option<RunnerOutput>, ExecFailure> {
    let mut cmd = shell_command(opts.shell.as_deref(), command);
    cmd.current_dir(&opts.cwd);

    if opts.clear_env {
        cmd.env_clear();
    }
    cmd.envs(&opts.env);

    match opts.stdio {
        StdioMode::Piped => {
            let output = cmd
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .map_err(ExecFailure::Spawn)?;

            if !output.status.success() {
                return Err(ExecFailure::NonZero {
                    status: output.status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                });
            }

            Ok(Some(decode(output.stdout, opts.encoding)))
        }
        StdioMode::Inherit | StdioMode::Null => {
            let sink = || match opts.stdio {
                StdioMode::Null => Stdio::null(),
                _ => Stdio::inherit(),
            };
            let status = cmd
                .stdout(sink())
                .stderr(sink())
                .status()
                .map_err(ExecFailure::Spawn)?;

            if !status.success() {
                return Err(ExecFailure::NonZero {
                    status,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                });
            }

            Ok(None)
        }
    }
}

fn shell_command(shell: Option<&str>, command: &str) -> Command {
    match shell {
        Some(program) => {
            let mut cmd = Command::new(program);
            cmd.arg("-c").arg(command);
            cmd
        }
        None if cfg!(windows) => {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        None => {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

fn decode(stdout: Vec<u8>, encoding: Encoding) -> RunnerOutput {
    match encoding {
        Encoding::Utf8 => RunnerOutput::Text(String::from_utf8_lossy(&stdout).into_owned()),
        Encoding::Bytes => RunnerOutput::Bytes(stdout),
    }
}
