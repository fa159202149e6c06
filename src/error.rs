//! Error types for go-dev-mcp.
//!
//! Uses thiserror for ergonomic error handling with proper
//! error chain propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level server error.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool error: {0}")]
    Tool(String),
}

/// Argument resolution errors (no filesystem writes, no subprocesses).
#[derive(Error, Debug)]
pub enum InputError {
    #[error("at least one of code/project_path/workspace_path must be provided")]
    MissingInput,

    #[error("project path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },
}

/// Workspace detection and go.work parsing errors.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("workspace path does not exist: {path}")]
    NotFound { path: PathBuf },

    #[error("not a Go workspace (no go.work and fewer than two modules): {path}")]
    NotAWorkspace { path: PathBuf },

    #[error("go.work not found in {path}")]
    GoWorkMissing { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Toolchain subprocess errors.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("'{binary}' not found on PATH")]
    ToolchainNotFound { binary: String },

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command execution timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("environment preparation failed: {0}")]
    Preparation(String),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

// Error code implementations for machine-readable error responses
impl ServerError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Input(e) => e.code(),
            Self::Workspace(e) => e.code(),
            Self::Exec(e) => e.code(),
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Tool(_) => "TOOL_ERROR",
        }
    }

}

impl InputError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput | Self::InvalidArgument { .. } => "VALIDATION_ERROR",
            Self::PathNotFound { .. } | Self::NotADirectory { .. } => "PATH_NOT_FOUND",
        }
    }
}

impl WorkspaceError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::NotAWorkspace { .. } | Self::GoWorkMissing { .. } => {
                "WORKSPACE_INVALID"
            }
            Self::Read { .. } => "IO_ERROR",
        }
    }
}

impl ExecError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ToolchainNotFound { .. } => "TOOLCHAIN_NOT_FOUND",
            Self::Spawn { .. } => "SPAWN_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Preparation(_) => "PREPARATION_ERROR",
        }
    }
}

// Conversion to rmcp protocol errors (server faults only; client-fixable
// errors are folded into the tool envelope instead).
impl From<ServerError> for rmcp::ErrorData {
    fn from(err: ServerError) -> Self {
        rmcp::ErrorData::internal_error(err.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ServerError::from(InputError::MissingInput).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ServerError::from(WorkspaceError::GoWorkMissing {
                path: PathBuf::from("/w")
            })
            .code(),
            "WORKSPACE_INVALID"
        );
        assert_eq!(
            ServerError::from(ExecError::Timeout { seconds: 30 }).code(),
            "TIMEOUT"
        );
        assert_eq!(
            ServerError::Tool("bad subcommand".into()).code(),
            "TOOL_ERROR"
        );
    }
}
