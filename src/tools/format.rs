//! The go_fmt tool.
//!
//! Raw-code input bypasses the strategy layer entirely: the text is
//! written to a temp file, `gofmt -w` rewrites it in place, and the
//! result is read back with a byte comparison deciding `codeChanged`.
//! Project and workspace input go through `go fmt` like any other
//! command.

use crate::config::Config;
use crate::error::ExecError;
use crate::exec::{self, runner};
use crate::input::{InputContext, Source, SourceParams};
use crate::report::Outcome;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the go_fmt tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct FmtParams {
    #[serde(flatten)]
    pub source: SourceParams,
    /// Workspace module to format (default: every package, ./...)
    pub module: Option<String>,
    /// Subprocess deadline in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Output for the go_fmt tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FmtOutput {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Formatted source, for raw-code input
    #[serde(rename = "formattedCode", skip_serializing_if = "Option::is_none")]
    pub formatted_code: Option<String>,
    /// Whether formatting changed the input
    #[serde(rename = "codeChanged", skip_serializing_if = "Option::is_none")]
    pub code_changed: Option<bool>,
}

impl FmtOutput {
    fn from_error(err: &crate::error::ServerError) -> Self {
        Self {
            outcome: Outcome::from_error("go_fmt", err),
            formatted_code: None,
            code_changed: None,
        }
    }
}

/// Assembles `fmt [module | ./...]` for project and workspace input.
pub(crate) fn fmt_args(module: Option<&str>) -> Vec<String> {
    vec![
        "fmt".to_string(),
        module
            .filter(|m| !m.is_empty())
            .unwrap_or("./...")
            .to_string(),
    ]
}

/// Executes the go_fmt tool.
pub async fn execute_fmt(config: &Config, params: FmtParams) -> FmtOutput {
    let input = match InputContext::resolve(&params.source) {
        Ok(input) => input,
        Err(e) => return FmtOutput::from_error(&e),
    };
    let deadline = config.effective_timeout(params.timeout_secs);

    match input.source {
        Source::Code => format_code(&input, deadline).await,
        _ => {
            let args = fmt_args(params.module.as_deref());
            let execution = match exec::execute(&input, &args, deadline).await {
                Ok(e) => e,
                Err(e) => return FmtOutput::from_error(&e),
            };
            FmtOutput {
                outcome: Outcome::from_execution("go_fmt", &execution.result),
                formatted_code: None,
                code_changed: None,
            }
        }
    }
}

/// gofmt round-trip over a single temp file.
async fn format_code(input: &InputContext, deadline: std::time::Duration) -> FmtOutput {
    let inner = async {
        let gofmt = runner::find_binary("gofmt")?;
        let dir = tempfile::TempDir::with_prefix("go-dev-mcp-")
            .map_err(|e| ExecError::Preparation(format!("temp dir creation failed: {e}")))?;
        let file = dir.path().join(&input.main_file);
        tokio::fs::write(&file, &input.code)
            .await
            .map_err(|e| ExecError::Preparation(format!("writing source failed: {e}")))?;

        let args = vec!["-w".to_string(), input.main_file.clone()];
        let result = runner::run_program(&gofmt, dir.path(), &args, deadline).await?;

        let formatted = if result.successful {
            Some(tokio::fs::read_to_string(&file).await.map_err(|e| {
                ExecError::Preparation(format!("reading formatted source failed: {e}"))
            })?)
        } else {
            None
        };
        Ok::<_, crate::error::ServerError>((result, formatted))
    };

    match inner.await {
        Ok((result, formatted)) => {
            let code_changed = formatted.as_deref().map(|f| f != input.code);
            FmtOutput {
                outcome: Outcome::from_execution("go_fmt", &result),
                formatted_code: formatted,
                code_changed,
            }
        }
        Err(e) => FmtOutput::from_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_args_default_and_module() {
        assert_eq!(fmt_args(None), vec!["fmt", "./..."]);
        assert_eq!(fmt_args(Some("./svc-a")), vec!["fmt", "./svc-a"]);
        assert_eq!(fmt_args(Some("")), vec!["fmt", "./..."]);
    }
}
