//! Tool-argument resolution into a typed execution context.
//!
//! Every tool that touches the Go toolchain shares the same source
//! vocabulary: raw `code`, a `project_path`, a `workspace_path`, or a
//! combination. [`InputContext::resolve`] validates the combination and
//! tags it with exactly one [`Source`] variant. The resolver performs
//! no filesystem writes and runs no subprocesses.

use crate::error::{InputError, ServerError, WorkspaceError};
use crate::workspace;
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default file name for single-file code input.
pub const DEFAULT_MAIN_FILE: &str = "main.go";

/// Shared source arguments, flattened into each tool's parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SourceParams {
    /// Go source text to operate on
    pub code: Option<String>,
    /// Path to an existing project directory
    pub project_path: Option<String>,
    /// Path to a Go workspace root (takes precedence over code and project_path)
    pub workspace_path: Option<String>,
    /// File name for single-file code input (default: main.go)
    #[serde(rename = "mainFile")]
    pub main_file: Option<String>,
    /// Source text for a companion test file
    #[serde(rename = "testCode")]
    pub test_code: Option<String>,
}

/// How the request sourced its Go code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Raw source text only; runs in a fresh temp module.
    Code,
    /// An existing project directory, used as-is.
    Project,
    /// Code plus a project: the project donates go.mod/go.sum, the
    /// supplied code is the authoritative source.
    Hybrid,
    /// A multi-module workspace root.
    Workspace,
}

impl Source {
    /// Human-readable tag used in logs and envelopes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Project => "project",
            Self::Hybrid => "hybrid",
            Self::Workspace => "workspace",
        }
    }
}

/// Immutable per-request execution context.
///
/// Invariants, enforced by [`InputContext::resolve`]:
/// 1. Exactly one `source` variant, by precedence workspace > hybrid >
///    project > code.
/// 2. `project_path` is an existing directory for Project/Hybrid.
/// 3. `workspace_path` is an existing, valid workspace for Workspace.
/// 4. `workspace_modules` is only populated for Workspace.
#[derive(Debug, Clone)]
pub struct InputContext {
    pub source: Source,
    pub code: String,
    pub project_path: Option<PathBuf>,
    pub workspace_path: Option<PathBuf>,
    pub workspace_modules: Vec<String>,
    pub main_file: String,
    pub test_code: Option<String>,
}

impl InputContext {
    /// Resolves shared source arguments into a typed context.
    ///
    /// # Errors
    ///
    /// - `WorkspaceInvalid` when `workspace_path` is absent on disk or
    ///   fails workspace detection.
    /// - `PathNotFound` when `project_path` does not exist.
    /// - `ValidationError` when no source argument is supplied.
    pub fn resolve(params: &SourceParams) -> crate::error::Result<Self> {
        let code = params.code.clone().unwrap_or_default();
        let main_file = params
            .main_file
            .clone()
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_MAIN_FILE.to_string());
        let test_code = params.test_code.clone().filter(|t| !t.is_empty());

        // Workspace precedence is absolute: code/project_path supplied
        // alongside a workspace_path are ignored by the strategy layer.
        if let Some(ws) = params.workspace_path.as_deref().filter(|p| !p.is_empty()) {
            let ws_path = existing_dir(ws).map_err(|_| WorkspaceError::NotFound {
                path: PathBuf::from(ws),
            })?;
            if !workspace::is_workspace(&ws_path) {
                return Err(WorkspaceError::NotAWorkspace { path: ws_path }.into());
            }
            let modules = workspace::detect_workspace_modules(&ws_path)?;
            return Ok(Self {
                source: Source::Workspace,
                code,
                project_path: None,
                workspace_path: Some(ws_path),
                workspace_modules: modules,
                main_file,
                test_code,
            });
        }

        if let Some(project) = params.project_path.as_deref().filter(|p| !p.is_empty()) {
            let project_path = existing_dir(project)?;
            let source = if code.is_empty() {
                Source::Project
            } else {
                Source::Hybrid
            };
            return Ok(Self {
                source,
                code,
                project_path: Some(project_path),
                workspace_path: None,
                workspace_modules: Vec::new(),
                main_file,
                test_code,
            });
        }

        if !code.is_empty() {
            return Ok(Self {
                source: Source::Code,
                code,
                project_path: None,
                workspace_path: None,
                workspace_modules: Vec::new(),
                main_file,
                test_code,
            });
        }

        Err(InputError::MissingInput.into())
    }

    /// Name of the companion test file: the main file's stem with
    /// `_test` appended before the extension (`main.go` → `main_test.go`).
    #[must_use]
    pub fn test_file_name(&self) -> String {
        test_companion_name(&self.main_file)
    }
}

/// Derives a `_test` companion file name from a source file name.
#[must_use]
pub fn test_companion_name(main_file: &str) -> String {
    let path = Path::new(main_file);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| main_file.to_string());
    match path.extension() {
        Some(ext) => format!("{stem}_test.{}", ext.to_string_lossy()),
        None => format!("{stem}_test"),
    }
}

/// Canonicalizes a user-supplied path and requires it to be an existing
/// directory.
fn existing_dir(raw: &str) -> Result<PathBuf, ServerError> {
    let path = PathBuf::from(raw);
    let resolved = dunce::canonicalize(&path).map_err(|_| InputError::PathNotFound {
        path: path.clone(),
    })?;
    if !resolved.is_dir() {
        return Err(InputError::NotADirectory { path: resolved }.into());
    }
    Ok(resolved)
}
