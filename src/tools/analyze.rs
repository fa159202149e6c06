//! The go_analyze tool: static analysis via go vet.
//!
//! Findings are data, not failures: the tool reports success whenever
//! the analysis itself could run, and carries any issues in the
//! payload.

use crate::config::Config;
use crate::exec;
use crate::input::{InputContext, Source, SourceParams};
use crate::report::{self, Outcome};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the go_analyze tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AnalyzeParams {
    #[serde(flatten)]
    pub source: SourceParams,
    /// Run go vet (currently the only analyzer; reserved for future use)
    #[serde(default = "default_vet")]
    pub vet: bool,
    /// Workspace module to analyze (default: every package, ./...)
    pub module: Option<String>,
    /// Subprocess deadline in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

const fn default_vet() -> bool {
    true
}

/// One finding reported by the analyzer.
#[derive(Debug, Serialize, JsonSchema)]
pub struct VetIssue {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// Output for the go_analyze tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AnalyzeOutput {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Findings; empty when the code is clean
    pub issues: Vec<VetIssue>,
    #[serde(rename = "workspacePath", skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<String>,
}

impl AnalyzeOutput {
    fn from_error(err: &crate::error::ServerError) -> Self {
        Self {
            outcome: Outcome::from_error("go_analyze", err),
            issues: Vec::new(),
            workspace_path: None,
        }
    }
}

/// Assembles `vet <target>`.
pub(crate) fn vet_args(source: Source, module: Option<&str>) -> Vec<String> {
    let target = match (source, module) {
        (Source::Workspace, Some(m)) if !m.is_empty() => m.to_string(),
        _ => "./...".to_string(),
    };
    vec!["vet".to_string(), target]
}

/// Executes the go_analyze tool.
pub async fn execute_analyze(config: &Config, params: AnalyzeParams) -> AnalyzeOutput {
    let input = match InputContext::resolve(&params.source) {
        Ok(input) => input,
        Err(e) => return AnalyzeOutput::from_error(&e),
    };
    let deadline = config.effective_timeout(params.timeout_secs);

    let args = vet_args(input.source, params.module.as_deref());
    let execution = match exec::execute(&input, &args, deadline).await {
        Ok(e) => e,
        Err(e) => return AnalyzeOutput::from_error(&e),
    };
    let result = &execution.result;

    // go vet reports findings on stderr with a non-zero exit.
    let issues: Vec<VetIssue> = report::parse_error_details(&result.stderr)
        .into_iter()
        .filter(|d| d.detail_type == "compilation")
        .map(|d| VetIssue {
            message: d.message,
            file: d.file,
            line: d.line,
            column: d.column,
        })
        .collect();

    let message = if issues.is_empty() && result.successful {
        format!("{} found no issues", result.command)
    } else {
        format!("{} found {} issue(s)", result.command, issues.len())
    };

    let mut outcome = Outcome::from_execution("go_analyze", result);
    // findings are payload, not tool failure
    outcome.success = true;
    outcome.message = message;
    outcome.error_details = None;
    outcome.nl_metadata.result = report::nl_hint("go_analyze", true).to_string();

    AnalyzeOutput {
        outcome,
        issues,
        workspace_path: input
            .workspace_path
            .as_ref()
            .map(|p| p.display().to_string()),
    }
}
