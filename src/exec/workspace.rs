//! Workspace strategy: working-directory adaptation for workspace
//! commands.
//!
//! `build`/`test`/`vet`/`fmt` against `./...` mean "every package below
//! the current module" and misbehave from a workspace root that is not
//! itself a module, so the strategy descends into the first module that
//! exists and carries a `go.mod`. `go work …` and everything else run
//! from the workspace root unchanged.

use crate::error::{Result, WorkspaceError};
use crate::input::InputContext;
use crate::workspace;
use std::path::PathBuf;

/// Commands whose `./...` form requires descending into a module.
const DESCEND_COMMANDS: [&str; 4] = ["build", "test", "vet", "fmt"];

pub fn working_dir(input: &InputContext, args: &[String]) -> Result<PathBuf> {
    let root = input.workspace_path.clone().ok_or_else(|| {
        WorkspaceError::NotFound {
            path: PathBuf::new(),
        }
    })?;
    if !workspace::is_workspace(&root) {
        return Err(WorkspaceError::NotAWorkspace { path: root }.into());
    }

    let descend = matches!(
        (args.first(), args.get(1)),
        (Some(cmd), Some(target))
            if DESCEND_COMMANDS.contains(&cmd.as_str()) && target == "./..."
    );
    if !descend {
        return Ok(root);
    }

    for module in &input.workspace_modules {
        let dir = workspace::module_dir(&root, module);
        if dir.is_dir() && dir.join("go.mod").is_file() {
            tracing::debug!(module = %module, "descending into workspace module");
            return Ok(dir);
        }
    }
    // No usable module; run from the root and let the toolchain report.
    Ok(root)
}
