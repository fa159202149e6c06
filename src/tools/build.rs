//! The go_build tool: compile raw code, a project, or a workspace.

use crate::config::Config;
use crate::exec;
use crate::input::{InputContext, Source, SourceParams};
use crate::report::Outcome;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input for the go_build tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct BuildParams {
    #[serde(flatten)]
    pub source: SourceParams,
    /// Build tags, comma separated (passed as -tags)
    #[serde(rename = "buildTags")]
    pub build_tags: Option<String>,
    /// Path for the compiled binary (passed as -o)
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    /// Subprocess deadline in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Output for the go_build tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BuildOutput {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Where the compiled binary was written
    #[serde(rename = "outputPath", skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(rename = "workspacePath", skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<String>,
    #[serde(rename = "workspaceModules", skip_serializing_if = "Option::is_none")]
    pub workspace_modules: Option<Vec<String>>,
}

impl BuildOutput {
    fn from_error(err: &crate::error::ServerError) -> Self {
        Self {
            outcome: Outcome::from_error("go_build", err),
            output_path: None,
            workspace_path: None,
            workspace_modules: None,
        }
    }
}

/// Assembles `build [-tags T] [-o OUT] <target>`.
///
/// The target is the main file for raw-code input and `./...`
/// otherwise. `out` is included only when the caller asked for a binary
/// or the build runs in a request-owned temp directory.
pub(crate) fn build_args(
    source: Source,
    main_file: &str,
    build_tags: Option<&str>,
    out: Option<&str>,
) -> Vec<String> {
    let mut args = vec!["build".to_string()];
    if let Some(tags) = build_tags.filter(|t| !t.is_empty()) {
        args.push("-tags".to_string());
        args.push(tags.to_string());
    }
    if let Some(out) = out {
        args.push("-o".to_string());
        args.push(out.to_string());
    }
    args.push(match source {
        Source::Code => main_file.to_string(),
        _ => "./...".to_string(),
    });
    args
}

/// Executes the go_build tool.
pub async fn execute_build(config: &Config, params: BuildParams) -> BuildOutput {
    let input = match InputContext::resolve(&params.source) {
        Ok(input) => input,
        Err(e) => return BuildOutput::from_error(&e),
    };
    let deadline = config.effective_timeout(params.timeout_secs);

    let mut args = build_args(
        input.source,
        &input.main_file,
        params.build_tags.as_deref(),
        params.output_path.as_deref(),
    );
    let prepared = match exec::prepare(&input, &args, deadline).await {
        Ok(p) => p,
        Err(e) => return BuildOutput::from_error(&e),
    };

    let out_path = match (&params.output_path, input.source) {
        (Some(explicit), _) => Some(explicit.clone()),
        // default binary lands in the request-owned temp dir
        (None, Source::Code | Source::Hybrid) => {
            let out = prepared
                .path()
                .join(binary_name(&input.main_file))
                .display()
                .to_string();
            args = build_args(
                input.source,
                &input.main_file,
                params.build_tags.as_deref(),
                Some(&out),
            );
            Some(out)
        }
        // never write into the user's tree unasked
        (None, Source::Project | Source::Workspace) => None,
    };
    let result = match exec::runner::run_go(prepared.path(), &args, deadline).await {
        Ok(r) => r,
        Err(e) => return BuildOutput::from_error(&e.into()),
    };

    let outcome = Outcome::from_execution("go_build", &result);
    BuildOutput {
        output_path: outcome.success.then_some(out_path).flatten(),
        workspace_path: input
            .workspace_path
            .as_ref()
            .map(|p| p.display().to_string()),
        workspace_modules: (input.source == Source::Workspace)
            .then(|| input.workspace_modules.clone()),
        outcome,
    }
}

/// Binary name derived from the main file (`main.go` → `main`).
fn binary_name(main_file: &str) -> String {
    Path::new(main_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_for_code_source() {
        let args = build_args(Source::Code, "main.go", None, Some("/tmp/x/main"));
        assert_eq!(args, vec!["build", "-o", "/tmp/x/main", "main.go"]);
    }

    #[test]
    fn test_args_for_project_source() {
        let args = build_args(Source::Project, "main.go", Some("integration"), None);
        assert_eq!(args, vec!["build", "-tags", "integration", "./..."]);
    }

    #[test]
    fn test_bare_workspace_shape_allows_descent() {
        let args = build_args(Source::Workspace, "main.go", None, None);
        assert_eq!(args, vec!["build", "./..."]);
    }

    #[test]
    fn test_binary_name() {
        assert_eq!(binary_name("main.go"), "main");
        assert_eq!(binary_name("server.go"), "server");
    }
}
