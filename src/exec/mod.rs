//! Execution strategies: working-directory preparation and bounded
//! invocation of the Go toolchain.
//!
//! Strategy selection is a four-way dispatch on the request's tagged
//! [`Source`] variant. Each strategy prepares a working directory (a
//! fresh temp dir for Code/Hybrid, the caller's directory for
//! Project/Workspace), then hands off to [`runner::run_go`]. Temp dirs
//! are owned by the request and removed on every exit path via
//! `TempDir`'s drop, including panics and cancelled futures.

mod code;
mod hybrid;
pub mod runner;
mod workspace;

pub use runner::ExecutionResult;

use crate::error::Result;
use crate::input::{InputContext, Source};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// The four execution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Code,
    Project,
    Hybrid,
    Workspace,
}

impl Strategy {
    /// Selects the strategy for a resolved input context.
    #[must_use]
    pub fn select(input: &InputContext) -> Self {
        match input.source {
            Source::Code => Self::Code,
            Source::Project => Self::Project,
            Source::Hybrid => Self::Hybrid,
            Source::Workspace => Self::Workspace,
        }
    }

    /// Tag used in logs.
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

/// A prepared working directory, either owned (and removed on drop) or
/// borrowed from the caller's filesystem.
#[derive(Debug)]
pub enum Workdir {
    Temp(TempDir),
    Existing(PathBuf),
}

/// Output of strategy preparation. Tools that need to read files back
/// out of the working directory (go_mod, go_fmt) hold this until done;
/// dropping it removes any temp dir it owns.
#[derive(Debug)]
pub struct Prepared {
    workdir: Workdir,
    strategy: Strategy,
}

impl Prepared {
    #[must_use]
    pub fn path(&self) -> &Path {
        match &self.workdir {
            Workdir::Temp(dir) => dir.path(),
            Workdir::Existing(path) => path,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// A completed strategy execution: the captured result plus the still-
/// live working directory.
#[derive(Debug)]
pub struct Execution {
    pub result: ExecutionResult,
    pub prepared: Prepared,
}

/// Prepares the working directory for `input` without running the
/// primary command. `deadline` bounds any preparation subprocesses
/// (`go mod init`, `go mod tidy`).
pub async fn prepare(
    input: &InputContext,
    args: &[String],
    deadline: Duration,
) -> Result<Prepared> {
    let strategy = Strategy::select(input);
    tracing::debug!(strategy = strategy.as_str(), "preparing working directory");
    let workdir = match strategy {
        Strategy::Code => Workdir::Temp(code::prepare(input, deadline).await?),
        Strategy::Hybrid => Workdir::Temp(hybrid::prepare(input, deadline).await?),
        Strategy::Project => {
            // Uses the project directory directly; writes nothing.
            let path = input
                .project_path
                .clone()
                .ok_or_else(|| crate::error::ExecError::Preparation(
                    "project strategy without a project path".to_string(),
                ))?;
            Workdir::Existing(path)
        }
        Strategy::Workspace => Workdir::Existing(workspace::working_dir(input, args)?),
    };
    Ok(Prepared { workdir, strategy })
}

/// Prepares a working directory and runs `go <args>` in it.
pub async fn execute(
    input: &InputContext,
    args: &[String],
    deadline: Duration,
) -> Result<Execution> {
    let prepared = prepare(input, args, deadline).await?;
    let result = runner::run_go(prepared.path(), args, deadline).await?;
    tracing::debug!(
        command = %result.command,
        exit_code = result.exit_code,
        duration = %result.duration_display(),
        "toolchain process finished"
    );
    Ok(Execution { result, prepared })
}
