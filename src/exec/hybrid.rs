//! Hybrid strategy: supplied code is authoritative, the project donates
//! its dependency graph.
//!
//! Only `go.mod` and `go.sum` are copied from the project; other
//! project files are intentionally left behind. `go mod tidy` then
//! reconciles the copied module file with the new code's imports on a
//! best-effort basis.

use crate::error::{ExecError, Result};
use crate::exec::{code, runner};
use crate::input::InputContext;
use std::time::Duration;
use tempfile::TempDir;

pub async fn prepare(input: &InputContext, deadline: Duration) -> Result<TempDir> {
    let project = input.project_path.as_deref().ok_or_else(|| {
        ExecError::Preparation("hybrid strategy without a project path".to_string())
    })?;

    let dir = TempDir::with_prefix("go-dev-mcp-")
        .map_err(|e| ExecError::Preparation(format!("temp dir creation failed: {e}")))?;

    for name in ["go.mod", "go.sum"] {
        let src = project.join(name);
        if src.is_file() {
            tokio::fs::copy(&src, dir.path().join(name))
                .await
                .map_err(|e| {
                    ExecError::Preparation(format!("copying {name} failed: {e}"))
                })?;
        }
    }

    code::write_sources(input, dir.path()).await?;

    // Non-fatal: a tidy failure leaves the copied go.mod as-is and the
    // primary command surfaces any remaining import problems.
    let tidy_args = vec!["mod".to_string(), "tidy".to_string()];
    match runner::run_go(dir.path(), &tidy_args, deadline).await {
        Ok(tidy) if !tidy.successful => {
            tracing::warn!(stderr = %tidy.stderr.trim(), "go mod tidy failed in hybrid setup");
        }
        Err(e) => {
            tracing::warn!(error = %e, "go mod tidy could not run in hybrid setup");
        }
        Ok(_) => {}
    }

    Ok(dir)
}
