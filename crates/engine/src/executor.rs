//! Shell command execution with timeouts and stderr classification.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use stacksmith_types::ExecutionError;

/// Executes one external command in a working directory.
///
/// The engine is generic over this seam so orchestration can be exercised
/// with scripted doubles and dry-run previews without spawning processes.
#[async_trait]
pub trait ShellRunner: Send + Sync {
    async fn run(&self, command: &str, cwd: &Path, timeout: Duration) -> Result<String, ExecutionError>;
}

/// Runner that spawns commands through the platform shell.
pub struct SystemShellRunner;

#[async_trait]
impl ShellRunner for SystemShellRunner {
    async fn run(&self, command: &str, cwd: &Path, timeout: Duration) -> Result<String, ExecutionError> {
        debug!(command, cwd = %cwd.display(), timeout_secs = timeout.as_secs(), "spawning shell command");
        let mut cmd = shell_command(command);
        cmd.current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|error| ExecutionError::Spawn {
            detail: error.to_string(),
        })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                return Err(ExecutionError::Spawn {
                    detail: error.to_string(),
                });
            }
            Err(_) => {
                warn!(command, timeout_secs = timeout.as_secs(), "command timed out; killing");
                return Err(ExecutionError::Timeout {
                    secs: timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!(command, code, "command exited non-zero");
            return Err(ExecutionError::NonZeroExit {
                code,
                detail: failure_detail(&stdout, &stderr),
            });
        }
        if stderr_is_fatal(&stderr) {
            warn!(command, "command exited 0 but stderr reported an error");
            return Err(ExecutionError::StderrReportedError {
                detail: stderr.trim().to_string(),
            });
        }
        debug!(command, "command finished");
        Ok(stdout)
    }
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Scaffolding CLIs routinely print benign warnings to stderr while some real
/// failures arrive with exit code 0. Stderr is fatal only when it mentions an
/// error without a WARN marker. The substring rule is knowingly fuzzy: a
/// benign message containing "Error" as part of a product name trips it.
fn stderr_is_fatal(stderr: &str) -> bool {
    !stderr.is_empty() && stderr.to_ascii_lowercase().contains("error") && !stderr.contains("WARN")
}

fn failure_detail(stdout: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    "no output captured".to_string()
}

/// Runner that records the command line without executing it.
///
/// Backs `--dry-run` previews: materialization still happens, external
/// mutations do not.
pub struct NoopRunner;

#[async_trait]
impl ShellRunner for NoopRunner {
    async fn run(&self, command: &str, cwd: &Path, _timeout: Duration) -> Result<String, ExecutionError> {
        info!(command, cwd = %cwd.display(), "dry-run: external command not executed");
        Ok(String::new())
    }
}

/// One invocation observed by a [`ScriptedRunner`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: String,
    pub cwd: PathBuf,
}

/// Test double that records every invocation and can fail on cue.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<RecordedCall>>,
    fail_on: Option<String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first command whose line contains `substring`; every other
    /// command succeeds with empty output.
    pub fn failing_on(substring: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(substring.into()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ShellRunner for ScriptedRunner {
    async fn run(&self, command: &str, cwd: &Path, _timeout: Duration) -> Result<String, ExecutionError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                command: command.to_string(),
                cwd: cwd.to_path_buf(),
            });
        }
        if let Some(marker) = &self.fail_on
            && command.contains(marker.as_str())
        {
            return Err(ExecutionError::NonZeroExit {
                code: 1,
                detail: format!("scripted failure for '{marker}'"),
            });
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_with_error_and_no_warn_marker_is_fatal() {
        assert!(stderr_is_fatal("Error: module not found"));
        assert!(stderr_is_fatal("npm ERR! peer dependency error"));
    }

    #[test]
    fn stderr_with_warn_marker_is_advisory() {
        assert!(!stderr_is_fatal("WARN: deprecated flag"));
        // A WARN marker anywhere downgrades the whole stream, by the same
        // substring rule the fuzzy classification is built on.
        assert!(!stderr_is_fatal("WARN something\nerror adjacent text"));
    }

    #[test]
    fn empty_or_benign_stderr_is_not_fatal() {
        assert!(!stderr_is_fatal(""));
        assert!(!stderr_is_fatal("added 12 packages in 3s"));
    }

    #[cfg(unix)]
    mod system {
        use super::super::*;

        #[tokio::test]
        async fn exit_zero_with_error_on_stderr_fails() {
            let runner = SystemShellRunner;
            let result = runner
                .run(
                    "echo 'Error: module not found' 1>&2",
                    Path::new("."),
                    Duration::from_secs(5),
                )
                .await;
            assert!(matches!(result, Err(ExecutionError::StderrReportedError { .. })));
        }

        #[tokio::test]
        async fn exit_zero_with_warn_on_stderr_succeeds() {
            let runner = SystemShellRunner;
            let result = runner
                .run(
                    "echo 'WARN: deprecated flag' 1>&2",
                    Path::new("."),
                    Duration::from_secs(5),
                )
                .await;
            assert!(result.is_ok());
        }

        #[tokio::test]
        async fn nonzero_exit_is_reported_with_code() {
            let runner = SystemShellRunner;
            let result = runner.run("exit 3", Path::new("."), Duration::from_secs(5)).await;
            match result {
                Err(ExecutionError::NonZeroExit { code, .. }) => assert_eq!(code, 3),
                other => panic!("expected NonZeroExit, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn overlong_command_times_out() {
            let runner = SystemShellRunner;
            let result = runner.run("sleep 5", Path::new("."), Duration::from_millis(100)).await;
            assert!(matches!(result, Err(ExecutionError::Timeout { .. })));
        }

        #[tokio::test]
        async fn stdout_is_captured_on_success() {
            let runner = SystemShellRunner;
            let output = runner
                .run("echo hello", Path::new("."), Duration::from_secs(5))
                .await
                .expect("echo succeeds");
            assert_eq!(output.trim(), "hello");
        }
    }
}
