//! The go_mod tool: module management subcommands.

use crate::config::Config;
use crate::error::{InputError, ServerError};
use crate::exec;
use crate::input::{InputContext, SourceParams};
use crate::report::Outcome;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Subcommands accepted by go_mod. Anything else is rejected before a
/// subprocess runs.
pub const MOD_SUBCOMMANDS: [&str; 7] = [
    "init", "tidy", "vendor", "verify", "why", "graph", "download",
];

/// Input for the go_mod tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ModParams {
    #[serde(flatten)]
    pub source: SourceParams,
    /// Module subcommand: init, tidy, vendor, verify, why, graph, download
    pub command: String,
    /// Module path argument (e.g. for init)
    #[serde(rename = "modulePath")]
    pub module_path: Option<String>,
    /// Subprocess deadline in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Output for the go_mod tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ModOutput {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// The subcommand that ran
    pub command: String,
    /// go.mod content after init/tidy
    #[serde(rename = "goModContent", skip_serializing_if = "Option::is_none")]
    pub go_mod_content: Option<String>,
}

impl ModOutput {
    fn from_error(command: &str, err: &ServerError) -> Self {
        Self {
            outcome: Outcome::from_error("go_mod", err),
            command: command.to_string(),
            go_mod_content: None,
        }
    }
}

/// Assembles `mod <subcommand> [modulePath]`.
pub(crate) fn mod_args(command: &str, module_path: Option<&str>) -> Vec<String> {
    let mut args = vec!["mod".to_string(), command.to_string()];
    if let Some(path) = module_path.filter(|p| !p.is_empty()) {
        args.push(path.to_string());
    }
    args
}

/// Executes the go_mod tool.
pub async fn execute_mod(config: &Config, params: ModParams) -> ModOutput {
    let command = params.command.trim().to_string();
    if !MOD_SUBCOMMANDS.contains(&command.as_str()) {
        return ModOutput::from_error(
            &command,
            &InputError::InvalidArgument {
                name: "command",
                reason: format!(
                    "unknown go_mod subcommand '{command}' (expected one of: {})",
                    MOD_SUBCOMMANDS.join(", ")
                ),
            }
            .into(),
        );
    }

    let input = match InputContext::resolve(&params.source) {
        Ok(input) => input,
        Err(e) => return ModOutput::from_error(&command, &e),
    };
    let deadline = config.effective_timeout(params.timeout_secs);

    let args = mod_args(&command, params.module_path.as_deref());
    let execution = match exec::execute(&input, &args, deadline).await {
        Ok(e) => e,
        Err(e) => return ModOutput::from_error(&command, &e),
    };

    // init and tidy rewrite go.mod; hand the result back to the client.
    let go_mod_content = if matches!(command.as_str(), "init" | "tidy")
        && execution.result.successful
    {
        tokio::fs::read_to_string(execution.prepared.path().join("go.mod"))
            .await
            .ok()
    } else {
        None
    };

    ModOutput {
        outcome: Outcome::from_execution("go_mod", &execution.result),
        command,
        go_mod_content,
    }
}
