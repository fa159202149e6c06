//! The go_test tool: run tests with optional coverage and filtering.

use crate::config::Config;
use crate::exec;
use crate::input::{InputContext, SourceParams};
use crate::report::Outcome;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the go_test tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct TestParams {
    #[serde(flatten)]
    pub source: SourceParams,
    /// Verbose test output (-v)
    #[serde(default)]
    pub verbose: bool,
    /// Collect coverage statistics (-cover)
    #[serde(default)]
    pub coverage: bool,
    /// Run only tests matching this pattern (-run)
    #[serde(rename = "testPattern")]
    pub test_pattern: Option<String>,
    /// Subprocess deadline in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Output for the go_test tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct TestOutput {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// True when every selected test passed
    #[serde(rename = "testsPassed")]
    pub tests_passed: bool,
    /// Coverage summary extracted from the test output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    #[serde(rename = "workspacePath", skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<String>,
}

impl TestOutput {
    fn from_error(err: &crate::error::ServerError) -> Self {
        Self {
            outcome: Outcome::from_error("go_test", err),
            tests_passed: false,
            coverage: None,
            workspace_path: None,
        }
    }
}

/// Assembles `test [-v] [-cover] [-run PATTERN] ./...`.
pub(crate) fn test_args(verbose: bool, coverage: bool, pattern: Option<&str>) -> Vec<String> {
    let mut args = vec!["test".to_string()];
    if verbose {
        args.push("-v".to_string());
    }
    if coverage {
        args.push("-cover".to_string());
    }
    if let Some(pattern) = pattern.filter(|p| !p.is_empty()) {
        args.push("-run".to_string());
        args.push(pattern.to_string());
    }
    args.push("./...".to_string());
    args
}

/// First line of stdout carrying a coverage figure.
pub(crate) fn extract_coverage(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|l| l.contains("coverage:"))
        .map(|l| l.trim().to_string())
}

/// Executes the go_test tool.
pub async fn execute_test(config: &Config, params: TestParams) -> TestOutput {
    let input = match InputContext::resolve(&params.source) {
        Ok(input) => input,
        Err(e) => return TestOutput::from_error(&e),
    };
    let deadline = config.effective_timeout(params.timeout_secs);

    let args = test_args(params.verbose, params.coverage, params.test_pattern.as_deref());
    let execution = match exec::execute(&input, &args, deadline).await {
        Ok(e) => e,
        Err(e) => return TestOutput::from_error(&e),
    };

    let coverage = extract_coverage(&execution.result.stdout);
    let outcome = Outcome::from_execution("go_test", &execution.result);
    TestOutput {
        tests_passed: outcome.success,
        coverage,
        workspace_path: input
            .workspace_path
            .as_ref()
            .map(|p| p.display().to_string()),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_full_shape() {
        let args = test_args(true, true, Some("TestParse.*"));
        assert_eq!(
            args,
            vec!["test", "-v", "-cover", "-run", "TestParse.*", "./..."]
        );
    }

    #[test]
    fn test_args_minimal_shape() {
        assert_eq!(test_args(false, false, None), vec!["test", "./..."]);
    }

    #[test]
    fn test_coverage_extraction() {
        let stdout = "ok  \texample.com/m\t0.012s\tcoverage: 85.0% of statements\n";
        assert_eq!(
            extract_coverage(stdout).as_deref(),
            Some("ok  \texample.com/m\t0.012s\tcoverage: 85.0% of statements")
        );
        assert!(extract_coverage("ok  \texample.com/m\t0.01s\n").is_none());
    }
}
