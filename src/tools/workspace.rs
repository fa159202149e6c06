//! The go_workspace tool: go.work lifecycle commands.

use crate::config::Config;
use crate::error::{InputError, ServerError, WorkspaceError};
use crate::exec::runner;
use crate::report::Outcome;
use crate::workspace::{self, WorkspaceInfo};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Input for the go_workspace tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct WorkspaceParams {
    /// Workspace command: init, use, sync, edit, vendor, info
    pub command: String,
    /// Workspace root directory
    pub workspace_path: String,
    /// Module paths for init and use
    #[serde(default)]
    pub modules: Vec<String>,
    /// Subprocess deadline in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Output for the go_workspace tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkspaceOutput {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// The command that ran
    pub command: String,
    #[serde(rename = "workspacePath")]
    pub workspace_path: String,
    /// Modules involved in the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
    /// Structured workspace description (info command)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<WorkspaceInfo>,
    /// go.work configuration as JSON (edit command)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
}

impl WorkspaceOutput {
    fn new(outcome: Outcome, command: &str, path: &str) -> Self {
        Self {
            outcome,
            command: command.to_string(),
            workspace_path: path.to_string(),
            modules: None,
            info: None,
            configuration: None,
        }
    }

    fn from_error(command: &str, path: &str, err: &ServerError) -> Self {
        Self::new(Outcome::from_error("go_workspace", err), command, path)
    }
}

/// Executes the go_workspace tool.
pub async fn execute_workspace(config: &Config, params: WorkspaceParams) -> WorkspaceOutput {
    let command = params.command.trim().to_string();
    let raw_path = params.workspace_path.clone();
    if raw_path.is_empty() {
        return WorkspaceOutput::from_error(
            &command,
            &raw_path,
            &InputError::InvalidArgument {
                name: "workspace_path",
                reason: "workspace_path is required".to_string(),
            }
            .into(),
        );
    }
    let deadline = config.effective_timeout(params.timeout_secs);
    let root = PathBuf::from(&raw_path);

    match command.as_str() {
        "init" => init_workspace(&root, &params.modules, deadline).await,
        "use" => use_modules(&root, &params.modules, deadline).await,
        "sync" => go_work_passthrough(&root, "sync", &["sync"], deadline).await,
        "vendor" => go_work_passthrough(&root, "vendor", &["vendor"], deadline).await,
        "edit" => edit_workspace(&root, deadline).await,
        "info" => info_workspace(&root),
        other => WorkspaceOutput::from_error(
            other,
            &raw_path,
            &InputError::InvalidArgument {
                name: "command",
                reason: format!(
                    "unknown go_workspace command '{other}' (expected one of: init, use, sync, edit, vendor, info)"
                ),
            }
            .into(),
        ),
    }
}

/// Creates the root if needed and runs `go work init <modules…>`.
async fn init_workspace(root: &Path, modules: &[String], deadline: Duration) -> WorkspaceOutput {
    let display = root.display().to_string();
    if !root.exists() {
        if let Err(e) = tokio::fs::create_dir_all(root).await {
            return WorkspaceOutput::from_error("init", &display, &e.into());
        }
    }

    let mut args = vec!["work".to_string(), "init".to_string()];
    args.extend(modules.iter().cloned());
    match runner::run_go(root, &args, deadline).await {
        Ok(result) => {
            let mut out = WorkspaceOutput::new(
                Outcome::from_execution("go_workspace", &result),
                "init",
                &display,
            );
            if result.successful {
                out.modules = Some(modules.to_vec());
            }
            out
        }
        Err(e) => WorkspaceOutput::from_error("init", &display, &e.into()),
    }
}

/// Runs `go work use <modules…>` against an existing workspace.
async fn use_modules(root: &Path, modules: &[String], deadline: Duration) -> WorkspaceOutput {
    let display = root.display().to_string();
    if let Err(e) = require_go_work(root) {
        return WorkspaceOutput::from_error("use", &display, &e);
    }
    if modules.is_empty() {
        return WorkspaceOutput::from_error(
            "use",
            &display,
            &InputError::InvalidArgument {
                name: "modules",
                reason: "'use' requires at least one module path".to_string(),
            }
            .into(),
        );
    }

    let mut args = vec!["work".to_string(), "use".to_string()];
    args.extend(modules.iter().cloned());
    match runner::run_go(root, &args, deadline).await {
        Ok(result) => {
            let mut out = WorkspaceOutput::new(
                Outcome::from_execution("go_workspace", &result),
                "use",
                &display,
            );
            if result.successful {
                out.modules = Some(modules.to_vec());
            }
            out
        }
        Err(e) => WorkspaceOutput::from_error("use", &display, &e.into()),
    }
}

/// `go work sync` / `go work vendor`: straight pass-through.
async fn go_work_passthrough(
    root: &Path,
    command: &str,
    subargs: &[&str],
    deadline: Duration,
) -> WorkspaceOutput {
    let display = root.display().to_string();
    if let Err(e) = require_go_work(root) {
        return WorkspaceOutput::from_error(command, &display, &e);
    }
    let mut args = vec!["work".to_string()];
    args.extend(subargs.iter().map(|s| s.to_string()));
    match runner::run_go(root, &args, deadline).await {
        Ok(result) => WorkspaceOutput::new(
            Outcome::from_execution("go_workspace", &result),
            command,
            &display,
        ),
        Err(e) => WorkspaceOutput::from_error(command, &display, &e.into()),
    }
}

/// `go work edit -json`: returns the parsed configuration.
async fn edit_workspace(root: &Path, deadline: Duration) -> WorkspaceOutput {
    let display = root.display().to_string();
    if let Err(e) = require_go_work(root) {
        return WorkspaceOutput::from_error("edit", &display, &e);
    }
    let args = vec![
        "work".to_string(),
        "edit".to_string(),
        "-json".to_string(),
    ];
    match runner::run_go(root, &args, deadline).await {
        Ok(result) => {
            let configuration = result
                .successful
                .then(|| serde_json::from_str(&result.stdout).ok())
                .flatten();
            let mut out = WorkspaceOutput::new(
                Outcome::from_execution("go_workspace", &result),
                "edit",
                &display,
            );
            out.configuration = configuration;
            out
        }
        Err(e) => WorkspaceOutput::from_error("edit", &display, &e.into()),
    }
}

/// Structured workspace description without running the toolchain.
fn info_workspace(root: &Path) -> WorkspaceOutput {
    let display = root.display().to_string();
    match workspace::workspace_info(root) {
        Ok(info) => {
            let mut out = WorkspaceOutput::new(
                Outcome::success(
                    "go_workspace",
                    format!("workspace at {display} has {} module(s)", info.modules.len()),
                ),
                "info",
                &display,
            );
            out.info = Some(info);
            out
        }
        Err(e) => WorkspaceOutput::from_error("info", &display, &e.into()),
    }
}

fn require_go_work(root: &Path) -> Result<(), ServerError> {
    if root.join("go.work").is_file() {
        Ok(())
    } else {
        Err(WorkspaceError::GoWorkMissing {
            path: root.to_path_buf(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    #[tokio::test]
    async fn test_unknown_command_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = execute_workspace(
            &Config::default(),
            WorkspaceParams {
                command: "destroy".to_string(),
                workspace_path: dir.path().display().to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(!out.outcome.success);
        assert!(out.outcome.message.contains("unknown go_workspace command"));
    }

    #[tokio::test]
    async fn test_missing_workspace_path_is_rejected() {
        let out = execute_workspace(
            &Config::default(),
            WorkspaceParams {
                command: "sync".to_string(),
                workspace_path: String::new(),
                ..Default::default()
            },
        )
        .await;
        assert!(!out.outcome.success);
        assert!(out.outcome.message.contains("workspace_path is required"));
    }

    #[tokio::test]
    async fn test_use_requires_existing_go_work() {
        let dir = tempfile::tempdir().unwrap();
        let out = execute_workspace(
            &Config::default(),
            WorkspaceParams {
                command: "use".to_string(),
                workspace_path: dir.path().display().to_string(),
                modules: vec!["./svc".to_string()],
                ..Default::default()
            },
        )
        .await;
        assert!(!out.outcome.success);
        assert!(out.outcome.message.contains("go.work not found"));
    }

    #[tokio::test]
    async fn test_use_requires_modules() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.work"), "go 1.21\n").unwrap();
        let out = execute_workspace(
            &Config::default(),
            WorkspaceParams {
                command: "use".to_string(),
                workspace_path: dir.path().display().to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(!out.outcome.success);
        assert!(out.outcome.message.contains("at least one module"));
    }

    #[tokio::test]
    async fn test_info_parses_parenthesized_block() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("go.work"),
            "go 1.21\nuse (\n    ./svc-a\n    ./lib/x  // helper\n)\n",
        )
        .unwrap();
        let out = execute_workspace(
            &Config::default(),
            WorkspaceParams {
                command: "info".to_string(),
                workspace_path: dir.path().display().to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(out.outcome.success);
        let info = out.info.unwrap();
        assert!(info.has_go_work);
        assert_eq!(info.modules, vec!["./svc-a", "./lib/x"]);
    }

    #[tokio::test]
    async fn test_info_on_empty_workspace() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.work"), "go 1.21\n").unwrap();
        let out = execute_workspace(
            &Config::default(),
            WorkspaceParams {
                command: "info".to_string(),
                workspace_path: dir.path().display().to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(out.outcome.success);
        let info = out.info.unwrap();
        assert!(info.has_go_work);
        assert!(info.modules.is_empty());
    }
}
