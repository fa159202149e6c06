//! Code strategy: raw source text in a fresh temp module.

use crate::error::{ExecError, Result};
use crate::exec::runner;
use crate::input::InputContext;
use std::time::Duration;
use tempfile::TempDir;

/// Prepares a temp directory holding the supplied code as a standalone
/// module: `go mod init temp`, then the main file and the optional
/// `_test` companion.
pub async fn prepare(input: &InputContext, deadline: Duration) -> Result<TempDir> {
    let dir = TempDir::with_prefix("go-dev-mcp-")
        .map_err(|e| ExecError::Preparation(format!("temp dir creation failed: {e}")))?;

    let init_args = vec!["mod".to_string(), "init".to_string(), "temp".to_string()];
    let init = runner::run_go(dir.path(), &init_args, deadline).await?;
    if !init.successful {
        return Err(ExecError::Preparation(format!(
            "go mod init failed: {}",
            init.stderr.trim()
        ))
        .into());
    }

    write_sources(input, dir.path()).await?;
    Ok(dir)
}

/// Writes the main file and, when present, the `_test` companion.
pub(super) async fn write_sources(input: &InputContext, dir: &std::path::Path) -> Result<()> {
    let main_path = dir.join(&input.main_file);
    tokio::fs::write(&main_path, &input.code)
        .await
        .map_err(|e| {
            ExecError::Preparation(format!("writing {} failed: {e}", input.main_file))
        })?;

    if let Some(test_code) = &input.test_code {
        let test_path = dir.join(input.test_file_name());
        tokio::fs::write(&test_path, test_code).await.map_err(|e| {
            ExecError::Preparation(format!("writing test companion failed: {e}"))
        })?;
    }
    Ok(())
}
