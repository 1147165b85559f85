use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::{error, info};

/// Runs a shell command, logging progress around it.
///
/// The standalone variant used by the release scripts. Unlike
/// [`relkit_core::CommandRunner::run`] it has no configurable state, logs
/// the captured output together with the finished message, and propagates
/// the underlying failure instead of normalizing it.
pub fn run(cmd: &str, loading_description: &str, finished_description: &str) -> Result<String> {
    info!("{loading_description}...");

    let output = shell_command(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn shell for '{cmd}'"))?;

    if !output.status.success() {
        let combined = [output.stdout.as_slice(), output.stderr.as_slice()].concat();
        error!(
            "Error {loading_description}\n{}",
            String::from_utf8_lossy(&combined).trim_end()
        );
        bail!("command failed with status {}: {cmd}", output.status);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    match stdout.trim_end() {
        "" => info!("{finished_description}"),
        text => info!("{finished_description} {text}"),
    }

    Ok(stdout)
}

fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut shell = Command::new("cmd");
        shell.arg("/C").arg(cmd);
        shell
    } else {
        let mut shell = Command::new("sh");
        shell.arg("-c").arg(cmd);
        shell
    }
}
