//! The go_run tool: compile and execute in one step.

use crate::config::Config;
use crate::exec;
use crate::input::{InputContext, Source, SourceParams};
use crate::report::Outcome;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default deadline for program execution, overridable per call.
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 30;

/// Input for the go_run tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RunParams {
    #[serde(flatten)]
    pub source: SourceParams,
    /// Arguments passed through to the program
    #[serde(default)]
    pub args: Vec<String>,
    /// Execution deadline in seconds (default: 30)
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Output for the go_run tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct RunOutput {
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(rename = "workspacePath", skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<String>,
}

impl RunOutput {
    fn from_error(err: &crate::error::ServerError) -> Self {
        Self {
            outcome: Outcome::from_error("go_run", err),
            workspace_path: None,
        }
    }
}

/// Assembles `run <target> <userArgs…>`.
pub(crate) fn run_args(source: Source, main_file: &str, user_args: &[String]) -> Vec<String> {
    let mut args = vec!["run".to_string()];
    args.push(match source {
        Source::Code => main_file.to_string(),
        _ => "./...".to_string(),
    });
    args.extend(user_args.iter().cloned());
    args
}

/// Executes the go_run tool.
pub async fn execute_run(config: &Config, params: RunParams) -> RunOutput {
    let input = match InputContext::resolve(&params.source) {
        Ok(input) => input,
        Err(e) => return RunOutput::from_error(&e),
    };
    let deadline =
        config.effective_timeout(Some(params.timeout_secs.unwrap_or(DEFAULT_RUN_TIMEOUT_SECS)));

    let args = run_args(input.source, &input.main_file, &params.args);
    let execution = match exec::execute(&input, &args, deadline).await {
        Ok(e) => e,
        Err(e) => return RunOutput::from_error(&e),
    };

    RunOutput {
        outcome: Outcome::from_execution("go_run", &execution.result),
        workspace_path: input
            .workspace_path
            .as_ref()
            .map(|p| p.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_code_with_passthrough() {
        let user = vec!["--port".to_string(), "8080".to_string()];
        let args = run_args(Source::Code, "main.go", &user);
        assert_eq!(args, vec!["run", "main.go", "--port", "8080"]);
    }

    #[test]
    fn test_run_args_project() {
        let args = run_args(Source::Project, "main.go", &[]);
        assert_eq!(args, vec!["run", "./..."]);
    }
}
