//! Bounded subprocess invocation of the Go toolchain.
//!
//! One deadline is applied per subprocess: the stricter of the tool's
//! `timeoutSecs` and the configured guard, computed by the caller. The
//! transport cancelling a request drops the in-flight future and
//! `kill_on_drop` terminates the child with it.

use crate::error::ExecError;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

/// Stderr text reported when the deadline expires before the child.
pub const TIMEOUT_STDERR: &str = "Command execution timed out";

/// Captured outcome of one toolchain subprocess.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; -1 when no status was produced (timeout, signal).
    pub exit_code: i32,
    pub duration: Duration,
    /// True iff the process exited cleanly with code 0 within the deadline.
    pub successful: bool,
    /// Fully rendered command line, for diagnostics.
    pub command: String,
}

impl ExecutionResult {
    /// Elapsed wall time rendered as e.g. `"1.234s"`.
    #[must_use]
    pub fn duration_display(&self) -> String {
        format!("{:.3}s", self.duration.as_secs_f64())
    }
}

/// Locates a toolchain binary on the host's search path.
pub fn find_binary(name: &str) -> Result<std::path::PathBuf, ExecError> {
    which::which(name).map_err(|_| ExecError::ToolchainNotFound {
        binary: name.to_string(),
    })
}

/// Runs `go <args>` in `workdir`, bounded by `deadline`.
///
/// Standard streams are captured; stdin is closed so the toolchain can
/// never block on input. On deadline expiry the child is killed and
/// reaped, and the result carries `exit_code = -1` with a timeout
/// marker in stderr.
pub async fn run_go(
    workdir: &Path,
    args: &[String],
    deadline: Duration,
) -> Result<ExecutionResult, ExecError> {
    let go = find_binary("go")?;
    run_program(&go, workdir, args, deadline).await
}

/// Runs an arbitrary toolchain program with the same capture and
/// deadline contract as [`run_go`]. Used by `go_fmt` for `gofmt`.
pub async fn run_program(
    program: &Path,
    workdir: &Path,
    args: &[String],
    deadline: Duration,
) -> Result<ExecutionResult, ExecError> {
    let rendered = render_command(program, args);
    tracing::debug!(command = %rendered, workdir = %workdir.display(), "spawning toolchain process");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    let child = cmd.spawn().map_err(|source| ExecError::Spawn {
        command: rendered.clone(),
        source,
    })?;

    match timeout(deadline, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let exit_code = output.status.code().unwrap_or(-1);
            Ok(ExecutionResult {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code,
                duration: start.elapsed(),
                successful: exit_code == 0,
                command: rendered,
            })
        }
        Ok(Err(source)) => Err(ExecError::Spawn {
            command: rendered,
            source,
        }),
        Err(_elapsed) => {
            // wait_with_output() took ownership of the child, so the
            // timed-out future holds it; dropping it triggers
            // kill_on_drop and the runtime reaps the process.
            tracing::warn!(command = %rendered, "deadline expired, child killed");
            Ok(ExecutionResult {
                stdout: String::new(),
                stderr: TIMEOUT_STDERR.to_string(),
                exit_code: -1,
                duration: start.elapsed(),
                successful: false,
                command: rendered,
            })
        }
    }
}

fn render_command(program: &Path, args: &[String]) -> String {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());
    if args.is_empty() {
        name
    } else {
        format!("{name} {}", args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command() {
        let args = vec!["build".to_string(), "./...".to_string()];
        assert_eq!(render_command(Path::new("/usr/bin/go"), &args), "go build ./...");
        assert_eq!(render_command(Path::new("gofmt"), &[]), "gofmt");
    }

    #[test]
    fn test_find_binary_missing() {
        let err = find_binary("definitely-not-a-real-binary-4242").unwrap_err();
        assert_eq!(err.code(), "TOOLCHAIN_NOT_FOUND");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_program_captures_streams() {
        let sh = find_binary("sh").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let args = vec!["-c".to_string(), "echo out; echo err >&2".to_string()];
        let result = run_program(&sh, dir.path(), &args, Duration::from_secs(10))
            .await
            .unwrap();
        assert!(result.successful);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_program_nonzero_exit() {
        let sh = find_binary("sh").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        let result = run_program(&sh, dir.path(), &args, Duration::from_secs(10))
            .await
            .unwrap();
        assert!(!result.successful);
        assert_eq!(result.exit_code, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deadline_kills_the_child() {
        let sh = find_binary("sh").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let args = vec!["-c".to_string(), "sleep 8".to_string()];
        let start = Instant::now();
        let result = run_program(&sh, dir.path(), &args, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!result.successful);
        assert_eq!(result.exit_code, -1);
        assert_eq!(result.stderr, TIMEOUT_STDERR);
        // bounded by deadline + reap latency, far below the sleep
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
