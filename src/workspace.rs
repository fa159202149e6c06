//! Go workspace detection and `go.work` parsing.
//!
//! A directory is a workspace when it carries a `go.work` file at its
//! root, or when at least two `go.mod` files exist somewhere below it.
//! Every workspace-mode operation gates on these rules.

use crate::error::WorkspaceError;
use ignore::WalkBuilder;
use schemars::JsonSchema;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Structured description of a workspace, as returned by the
/// `go_workspace info` command.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkspaceInfo {
    /// Workspace root directory.
    pub path: String,
    /// Whether a go.work file exists at the root.
    #[serde(rename = "hasGoWork")]
    pub has_go_work: bool,
    /// Module paths in declaration (go.work) or lexical (walk) order.
    pub modules: Vec<String>,
}

/// Parses `go.work` content and extracts the module paths.
///
/// Both directive forms are recognized:
///
/// ```text
/// use ./pathA                 // single-line form
/// use (                       // parenthesized block form
///     ./pathB
///     ./pathC   // trailing comments permitted
/// )
/// ```
///
/// Line comments and blank lines are ignored; module paths are kept
/// verbatim, including the `./` prefix.
#[must_use]
pub fn parse_go_work(content: &str) -> Vec<String> {
    let mut modules = Vec::new();
    let mut in_block = false;

    for raw in content.lines() {
        let line = match raw.find("//") {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if in_block {
            if line == ")" {
                in_block = false;
            } else {
                modules.push(line.to_string());
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("use") {
            let rest = rest.trim();
            if rest == "(" {
                in_block = true;
            } else if !rest.is_empty() {
                modules.push(rest.to_string());
            }
        }
        // go / toolchain / replace directives are not module paths
    }

    modules
}

/// Reads and parses a `go.work` file.
///
/// # Errors
///
/// Returns `WorkspaceError::Read` when the file cannot be read.
pub fn parse_go_work_file(path: &Path) -> Result<Vec<String>, WorkspaceError> {
    let content = std::fs::read_to_string(path).map_err(|source| WorkspaceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_go_work(&content))
}

/// Returns true when `path` is a Go workspace: a `go.work` file exists
/// at the root, or the tree below holds two or more `go.mod` files.
#[must_use]
pub fn is_workspace(path: &Path) -> bool {
    if path.join("go.work").is_file() {
        return true;
    }

    // Walk stops as soon as the second go.mod appears.
    let mut found = 0usize;
    for entry in WalkBuilder::new(path).standard_filters(false).build() {
        let Ok(entry) = entry else { continue };
        if entry.file_type().is_some_and(|t| t.is_file())
            && entry.file_name() == OsStr::new("go.mod")
        {
            found += 1;
            if found >= 2 {
                return true;
            }
        }
    }
    false
}

/// Enumerates the module paths of a workspace root.
///
/// With a `go.work` present the declared `use` entries are returned in
/// file order. Otherwise the tree is walked and each directory holding
/// a `go.mod` is emitted relative to the root with a `./` prefix (the
/// root itself becomes `./`), sorted for determinism. Unreadable
/// entries are skipped, not fatal.
pub fn detect_workspace_modules(root: &Path) -> Result<Vec<String>, WorkspaceError> {
    let go_work = root.join("go.work");
    if go_work.is_file() {
        return parse_go_work_file(&go_work);
    }

    let mut modules = Vec::new();
    for entry in WalkBuilder::new(root).standard_filters(false).build() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_some_and(|t| t.is_file())
            || entry.file_name() != OsStr::new("go.mod")
        {
            continue;
        }
        let dir = entry.path().parent().unwrap_or(root);
        let rel = dir.strip_prefix(root).unwrap_or(dir);
        if rel.as_os_str().is_empty() {
            modules.push("./".to_string());
        } else {
            modules.push(format!("./{}", rel.display()));
        }
    }
    modules.sort();
    Ok(modules)
}

/// Combines detection and enumeration into a [`WorkspaceInfo`].
///
/// # Errors
///
/// Returns `WorkspaceError::NotFound` when the path does not exist.
pub fn workspace_info(path: &Path) -> Result<WorkspaceInfo, WorkspaceError> {
    if !path.is_dir() {
        return Err(WorkspaceError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let has_go_work = path.join("go.work").is_file();
    let modules = detect_workspace_modules(path)?;
    Ok(WorkspaceInfo {
        path: path.display().to_string(),
        has_go_work,
        modules,
    })
}

/// Resolves a workspace module entry (e.g. `./svc-a`) to an absolute
/// directory under the root.
#[must_use]
pub fn module_dir(root: &Path, module: &str) -> PathBuf {
    let trimmed = module.trim_start_matches("./");
    if trimmed.is_empty() {
        root.to_path_buf()
    } else {
        root.join(trimmed)
    }
}
