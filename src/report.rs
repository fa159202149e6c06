//! Result assembly: the common response envelope, Go compiler
//! diagnostic parsing, and natural-language hints.
//!
//! Every tool's output struct flattens an [`Outcome`]. Parsing is
//! additive: raw stderr is always preserved verbatim next to any
//! structured `errorDetails` extracted from it.

use crate::error::{ExecError, ServerError};
use crate::exec::runner::{ExecutionResult, TIMEOUT_STDERR};
use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::LazyLock;

/// `file:line[:col]: message` as printed by the Go toolchain.
static DIAGNOSTIC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^\s:]+):(\d+)(?::(\d+))?:\s?(.*)$").expect("valid regex"));

/// Common envelope carried by every tool response.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Outcome {
    /// False iff the tool reports a hard failure.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(rename = "exitCode", skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Elapsed wall time, e.g. "1.234s".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Structured diagnostics parsed from stderr; present only on failure.
    #[serde(rename = "errorDetails", skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Vec<ErrorDetail>>,
    /// Natural-language hint for the client.
    pub nl_metadata: NlMetadata,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct NlMetadata {
    pub result: String,
}

/// One parsed diagnostic from toolchain stderr.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ErrorDetail {
    /// "compilation" for `file:line[:col]: message` lines, else "unknown".
    #[serde(rename = "type")]
    pub detail_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<&'static str>>,
}

impl Outcome {
    /// Assembles the envelope for a completed subprocess.
    #[must_use]
    pub fn from_execution(tool: &str, exec: &ExecutionResult) -> Self {
        let timed_out = exec.exit_code == -1 && exec.stderr == TIMEOUT_STDERR;
        let message = if exec.successful {
            format!("{} succeeded in {}", exec.command, exec.duration_display())
        } else if timed_out {
            TIMEOUT_STDERR.to_string()
        } else {
            format!(
                "{} failed with exit code {}",
                exec.command, exec.exit_code
            )
        };

        let error_details = if exec.successful || timed_out {
            None
        } else {
            let details = parse_error_details(&exec.stderr);
            (!details.is_empty()).then_some(details)
        };

        Self {
            success: exec.successful,
            message,
            stdout: non_empty(&exec.stdout),
            stderr: non_empty(&exec.stderr),
            exit_code: Some(exec.exit_code),
            duration: Some(exec.duration_display()),
            error_details,
            nl_metadata: NlMetadata {
                result: nl_hint(tool, exec.successful).to_string(),
            },
        }
    }

    /// Assembles a failure envelope for an error raised before or
    /// instead of the primary subprocess.
    #[must_use]
    pub fn from_error(tool: &str, err: &ServerError) -> Self {
        let exit_code = match err {
            ServerError::Exec(ExecError::Timeout { .. }) => Some(-1),
            _ => None,
        };
        Self {
            success: false,
            message: err.to_string(),
            stdout: None,
            stderr: None,
            exit_code,
            duration: None,
            error_details: None,
            nl_metadata: NlMetadata {
                result: nl_hint(tool, false).to_string(),
            },
        }
    }

    /// A success envelope for tools that did not run a subprocess
    /// (e.g. `go_workspace info`).
    #[must_use]
    pub fn success(tool: &str, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            stdout: None,
            stderr: None,
            exit_code: None,
            duration: None,
            error_details: None,
            nl_metadata: NlMetadata {
                result: nl_hint(tool, true).to_string(),
            },
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Splits toolchain stderr into structured diagnostics.
///
/// Lines of the form `file:line[:col]: message` become "compilation"
/// records; anything else non-blank becomes an "unknown" record so that
/// no diagnostic text is lost.
#[must_use]
pub fn parse_error_details(stderr: &str) -> Vec<ErrorDetail> {
    let mut details = Vec::new();
    for line in stderr.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(caps) = DIAGNOSTIC_LINE.captures(line) {
            let message = caps[4].to_string();
            details.push(ErrorDetail {
                detail_type: "compilation",
                suggestions: suggestions_for(&message),
                file: Some(caps[1].to_string()),
                line: caps[2].parse().ok(),
                column: caps.get(3).and_then(|c| c.as_str().parse().ok()),
                message,
            });
        } else {
            details.push(ErrorDetail {
                detail_type: "unknown",
                message: line.to_string(),
                file: None,
                line: None,
                column: None,
                suggestions: None,
            });
        }
    }
    details
}

fn suggestions_for(message: &str) -> Option<Vec<&'static str>> {
    if message.contains("undefined:") || message.contains("undeclared name:") {
        Some(vec![
            "Check that the identifier is spelled correctly",
            "Verify the package that defines it is imported",
        ])
    } else if message.contains("syntax error:") {
        Some(vec![
            "Check for unbalanced braces or parentheses",
            "Look for missing commas or semicolons",
        ])
    } else {
        None
    }
}

/// Static natural-language hint table keyed by tool name and outcome.
#[must_use]
pub fn nl_hint(tool: &str, success: bool) -> &'static str {
    match (tool, success) {
        ("go_build", true) => "The code was successfully compiled",
        ("go_build", false) => "Compilation failed; see the error details",
        ("go_run", true) => "The program executed successfully",
        ("go_run", false) => "The program failed to run",
        ("go_test", true) => "All tests passed",
        ("go_test", false) => "Tests failed or could not be run",
        ("go_fmt", true) => "The code was formatted successfully",
        ("go_fmt", false) => "Formatting failed",
        ("go_mod", true) => "The module operation completed successfully",
        ("go_mod", false) => "The module operation failed",
        ("go_analyze", true) => "Analysis completed",
        ("go_analyze", false) => "Analysis could not be completed",
        ("go_workspace", true) => "The workspace operation completed successfully",
        ("go_workspace", false) => "The workspace operation failed",
        (_, true) => "The operation completed",
        (_, false) => "The operation failed",
    }
}
