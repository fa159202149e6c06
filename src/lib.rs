//! go-dev-mcp: MCP server exposing Go toolchain operations.
//!
//! The server receives tool invocations over JSON-RPC (stdio), resolves
//! their arguments into a typed input context, picks an execution
//! strategy, runs the Go toolchain in a bounded subprocess, and returns
//! a structured JSON envelope.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              MCP Server (rmcp)              │
//! │         JSON-RPC over stdin/stdout          │
//! └─────────────────┬───────────────────────────┘
//!                   │ dispatch: fuzzy match · authz · logging
//! ┌─────────────────▼───────────────────────────┐
//! │                Tool Router                   │
//! │  go_build, go_run, go_test, go_fmt, ...     │
//! └─────────────────┬───────────────────────────┘
//!                   │ InputContext (code/project/hybrid/workspace)
//! ┌─────────────────▼───────────────────────────┐
//! │           Execution Strategies               │
//! │   temp-module · in-place · donor go.mod ·   │
//! │   workspace descent                          │
//! └─────────────────┬───────────────────────────┘
//!                   │ bounded subprocess (tokio::process)
//! ┌─────────────────▼───────────────────────────┐
//! │              Go toolchain                    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod fmt;
pub mod input;
pub mod report;
pub mod server;
pub mod tools;
pub mod workspace;

pub use error::{Result, ServerError};
pub use input::{InputContext, Source};

use std::path::PathBuf;

/// Computes the default configuration file path.
///
/// `%APPDATA%\go-dev-mcp\config.json` on Windows,
/// `~/Library/Application Support/go-dev-mcp/config.json` on macOS,
/// `~/.config/go-dev-mcp/config.json` elsewhere.
#[must_use]
pub fn default_config_path() -> PathBuf {
    config::config_dir().join("config.json")
}
