use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command::{Runnable, RunnerOutput};
use crate::error::RunError;
use crate::exec;
use crate::log::{LogLevel, LogSink, TracingLog};
use crate::options::{ExecOptions, RawOptions, RunOptions, RunnerOptions};

/// Runs shell commands (or in-process callables) with progress logging and
/// normalized error reporting.
///
/// An instance holds a base working directory, a log sink, and default
/// execution options; it is created once and reused across calls. Calls are
/// independent: `run` never mutates the configuration beyond lazily
/// creating the default log sink.
#[derive(Debug)]
pub struct CommandRunner {
    dir: PathBuf,
    log: Option<Arc<dyn LogSink>>,
    verbose: bool,
    raw_options: RawOptions,
}

/// Captured failure streams, surfaced through the log before normalizing.
struct FailureStreams {
    stdout: Option<String>,
    stderr: Option<String>,
}

impl CommandRunner {
    pub fn new(options: RunnerOptions) -> Self {
        let mut runner = Self {
            dir: options
                .dir
                .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
            log: None,
            verbose: false,
            raw_options: options.raw_options.unwrap_or_default(),
        };

        if let Some(log) = options.log {
            runner.set_log(Some(log));
        } else if options.verbose {
            runner.verbose = true;
            runner.set_log(None);
        }

        runner
    }

    /// Base directory commands run in.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// The active log sink, if one has been supplied or created.
    pub fn log(&self) -> Option<&Arc<dyn LogSink>> {
        self.log.as_ref()
    }

    /// Installs `log`, or the default `tracing`-backed sink when `None`
    /// (debug detail when the runner is verbose, info otherwise). Safe to
    /// call repeatedly; an explicit sink always replaces the active one.
    pub fn set_log(&mut self, log: Option<Arc<dyn LogSink>>) {
        self.log = Some(
            log.unwrap_or_else(|| Arc::new(TracingLog::new(default_level(self.verbose)))),
        );
    }

    fn active_log(&mut self) -> Arc<dyn LogSink> {
        if self.log.is_none() {
            self.set_log(None);
        }
        match &self.log {
            Some(log) => Arc::clone(log),
            // set_log above always fills the slot in
            None => Arc::new(TracingLog::new(LogLevel::Info)),
        }
    }

    /// Runs a command synchronously, blocking until it completes.
    ///
    /// Shell commands execute in the resolved working directory with the
    /// layered execution options; callables are invoked directly and ignore
    /// both. On failure the captured output streams are logged and a
    /// uniform [`RunError`] is raised in their place.
    pub fn run(
        &mut self,
        cmd: impl Into<Runnable>,
        options: RunOptions,
    ) -> Result<Option<RunnerOutput>, RunError> {
        let log = self.active_log();

        if let Some(loading) = &options.loading_description {
            log.info(&format!("{loading}..."));
        }

        let cwd = match &options.dir {
            Some(rel) => self.dir.join(rel),
            None => self.dir.clone(),
        };
        let exec_options =
            ExecOptions::resolve(cwd, &self.raw_options, options.raw_options.as_ref());

        let outcome = match cmd.into() {
            Runnable::Shell(command) => exec::shell(&command, &exec_options).map_err(|err| {
                FailureStreams {
                    stdout: err.stdout_text(),
                    stderr: err.stderr_text(),
                }
            }),
            Runnable::Callable(call) => call().map_err(|_| FailureStreams {
                stdout: None,
                stderr: None,
            }),
        };

        match outcome {
            Ok(value) => {
                if self.verbose || options.verbose {
                    if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                        // Raw inspection goes to stdout, unfiltered by the
                        // sink's level; structured logs go to stderr.
                        println!("{value}");
                    }
                }

                if let Some(finished) = &options.finished_description {
                    log.info(finished);
                }

                Ok(value)
            }
            Err(streams) => {
                let error = RunError::new(
                    options
                        .loading_description
                        .unwrap_or_else(|| "running command".to_string()),
                );
                log.error(&error.to_string());

                if let Some(stdout) = streams.stdout {
                    log.info(&stdout);
                }
                if let Some(stderr) = streams.stderr {
                    log.error(&stderr);
                }

                Err(error)
            }
        }
    }

    /// Runs a command as a deferred completion.
    ///
    /// A thin adaptation of [`CommandRunner::run`]: the body contains no
    /// await points, so the underlying command still blocks the polling
    /// thread for its full duration. The future resolves with exactly what
    /// `run` would return and rejects with exactly what it would raise.
    pub async fn run_async(
        &mut self,
        cmd: impl Into<Runnable>,
        options: RunOptions,
    ) -> Result<Option<RunnerOutput>, RunError> {
        self.run(cmd, options)
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(RunnerOptions::default())
    }
}

/// Detail level of the default sink: debug for verbose runners, info else.
fn default_level(verbose: bool) -> LogLevel {
    if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingLog {
        entries: Mutex<Vec<(LogLevel, String)>>,
    }

    impl RecordingLog {
        fn entries(&self) -> Vec<(LogLevel, String)> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl LogSink for RecordingLog {
        fn debug(&self, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push((LogLevel::Debug, message.to_string()));
        }

        fn info(&self, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push((LogLevel::Info, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push((LogLevel::Error, message.to_string()));
        }
    }

    fn recording_runner() -> (CommandRunner, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        let runner = CommandRunner::new(RunnerOptions {
            log: Some(log.clone()),
            ..Default::default()
        });
        (runner, log)
    }

    #[test]
    fn logs_loading_and_finished_around_success() {
        let (mut runner, log) = recording_runner();

        runner
            .run(
                "true",
                RunOptions {
                    loading_description: Some("Building".into()),
                    finished_description: Some("Built".into()),
                    ..Default::default()
                },
            )
            .expect("true should succeed");

        assert_eq!(
            log.entries(),
            vec![
                (LogLevel::Info, "Building...".to_string()),
                (LogLevel::Info, "Built".to_string()),
            ]
        );
    }

    #[test]
    fn failure_is_normalized_and_stderr_logged_once() {
        let (mut runner, log) = recording_runner();

        let err = runner
            .run(
                "echo boom >&2; exit 1",
                RunOptions {
                    loading_description: Some("Packing".into()),
                    ..Default::default()
                },
            )
            .expect_err("must fail");

        assert_eq!(err.to_string(), "Error Packing");

        let entries = log.entries();
        assert_eq!(entries[0], (LogLevel::Info, "Packing...".to_string()));
        assert_eq!(entries[1], (LogLevel::Error, "Error Packing".to_string()));
        let stderr_lines: Vec<_> = entries
            .iter()
            .filter(|(level, msg)| *level == LogLevel::Error && msg == "boom\n")
            .collect();
        assert_eq!(stderr_lines.len(), 1);
    }

    #[test]
    fn failure_surfaces_captured_stdout_at_info() {
        let (mut runner, log) = recording_runner();

        runner
            .run(
                "echo partial; exit 1",
                RunOptions {
                    loading_description: Some("Publishing".into()),
                    ..Default::default()
                },
            )
            .expect_err("must fail");

        assert!(log
            .entries()
            .contains(&(LogLevel::Info, "partial\n".to_string())));
    }

    #[test]
    fn missing_loading_description_still_yields_a_message() {
        let (mut runner, _log) = recording_runner();

        let err = runner
            .run("exit 1", RunOptions::default())
            .expect_err("must fail");
        assert_eq!(err.to_string(), "Error running command");
    }

    #[test]
    fn callables_skip_shell_execution_and_return_their_value() {
        let (mut runner, _log) = recording_runner();

        // The directory does not exist; a shell command would fail to spawn.
        let value = runner
            .run(
                Runnable::callable(|| Ok(Some(RunnerOutput::Text("computed".into())))),
                RunOptions {
                    dir: Some(PathBuf::from("does/not/exist")),
                    ..Default::default()
                },
            )
            .expect("callable should succeed");

        assert_eq!(value, Some(RunnerOutput::Text("computed".into())));
    }

    #[test]
    fn failing_callable_is_normalized() {
        let (mut runner, log) = recording_runner();

        let err = runner
            .run(
                Runnable::callable(|| Err(anyhow::anyhow!("inner detail"))),
                RunOptions {
                    loading_description: Some("Preparing".into()),
                    ..Default::default()
                },
            )
            .expect_err("must fail");

        // The inner detail is not chained into the normalized error.
        assert_eq!(err.to_string(), "Error Preparing");
        assert!(log
            .entries()
            .contains(&(LogLevel::Error, "Error Preparing".to_string())));
    }

    #[test]
    fn relative_call_dir_joins_onto_the_base() {
        let base = tempfile::tempdir().unwrap();
        std::fs::create_dir(base.path().join("sub")).unwrap();
        std::fs::write(base.path().join("sub/marker"), b"").unwrap();

        let mut runner = CommandRunner::new(RunnerOptions {
            dir: Some(base.path().to_path_buf()),
            ..Default::default()
        });

        let value = runner
            .run(
                "ls",
                RunOptions {
                    dir: Some(PathBuf::from("sub")),
                    ..Default::default()
                },
            )
            .expect("ls should succeed");
        assert_eq!(value, Some(RunnerOutput::Text("marker\n".into())));
    }

    #[test]
    fn instance_and_call_options_layer_per_key() {
        let mut instance_env = BTreeMap::new();
        instance_env.insert("A".to_string(), "1".to_string());
        instance_env.insert("B".to_string(), "2".to_string());

        let mut call_env = BTreeMap::new();
        call_env.insert("B".to_string(), "3".to_string());
        call_env.insert("C".to_string(), "4".to_string());

        let mut runner = CommandRunner::new(RunnerOptions {
            raw_options: Some(RawOptions {
                env: instance_env,
                ..Default::default()
            }),
            ..Default::default()
        });

        let value = runner
            .run(
                r#"printf %s "$A-$B-$C""#,
                RunOptions {
                    raw_options: Some(RawOptions {
                        env: call_env,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .expect("printf should succeed");
        assert_eq!(value, Some(RunnerOutput::Text("1-3-4".into())));
    }

    #[test]
    fn logger_is_created_lazily_on_first_run() {
        let mut runner = CommandRunner::default();
        assert!(runner.log().is_none());

        runner.run("true", RunOptions::default()).unwrap();
        assert!(runner.log().is_some());
    }

    #[test]
    fn default_sink_level_follows_verbosity() {
        assert_eq!(default_level(true), LogLevel::Debug);
        assert_eq!(default_level(false), LogLevel::Info);
    }

    #[test]
    fn verbose_construction_creates_the_logger_immediately() {
        let runner = CommandRunner::new(RunnerOptions {
            verbose: true,
            ..Default::default()
        });
        assert!(runner.verbose());
        assert!(runner.log().is_some());
    }

    #[test]
    fn set_log_replaces_the_active_sink() {
        let mut runner = CommandRunner::default();
        runner.set_log(None);
        assert!(runner.log().is_some());

        let recorder = Arc::new(RecordingLog::default());
        runner.set_log(Some(recorder.clone()));
        runner
            .run(
                "true",
                RunOptions {
                    finished_description: Some("Done".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(recorder.entries(), vec![(LogLevel::Info, "Done".to_string())]);
    }

    #[tokio::test]
    async fn run_async_matches_run_on_success() {
        let (mut runner, _log) = recording_runner();

        let value = runner
            .run_async("printf hi", RunOptions::default())
            .await
            .expect("printf should succeed");
        assert_eq!(value, Some(RunnerOutput::Text("hi".into())));
    }

    #[tokio::test]
    async fn run_async_rejects_with_the_normalized_error() {
        let (mut runner, _log) = recording_runner();

        let err = runner
            .run_async(
                "exit 7",
                RunOptions {
                    loading_description: Some("Linting".into()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("must fail");
        assert_eq!(err.to_string(), "Error Linting");
    }
}
