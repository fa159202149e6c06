//! MCP server implementation using rmcp.

use crate::config::Config;
use crate::dispatch;
use crate::error::ServerError;
use crate::report::Outcome;
use crate::tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::ToolCallContext;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_router, RoleServer, ServerHandler};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

/// Runs a tool future on its own task and folds the result into an MCP
/// response. The envelope's `success` flag drives `isError`; a panic in
/// the handler becomes a failure envelope, never a transport error.
async fn run_tool<T, F>(tool: &'static str, fut: F) -> Result<CallToolResult, rmcp::ErrorData>
where
    T: Serialize + Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(output) => {
            let value = serde_json::to_value(&output)
                .map_err(|e| rmcp::ErrorData::internal_error(e.to_string(), None))?;
            let failed = value.get("success").and_then(serde_json::Value::as_bool) == Some(false);
            let text = Content::text(value.to_string());
            Ok(if failed {
                CallToolResult::error(vec![text])
            } else {
                CallToolResult::success(vec![text])
            })
        }
        Err(join_err) => {
            let outcome = Outcome::from_error(
                tool,
                &ServerError::Tool(format!("tool handler panicked: {join_err}")),
            );
            let json = serde_json::to_string(&outcome)
                .map_err(|e| rmcp::ErrorData::internal_error(e.to_string(), None))?;
            Ok(CallToolResult::error(vec![Content::text(json)]))
        }
    }
}

/// MCP server for Go toolchain operations.
#[derive(Clone)]
pub struct GoDevServer {
    config: Arc<Config>,
    /// Optional allow-set; `None` permits every registered tool.
    allowed_tools: Option<Arc<HashSet<String>>>,
    /// Tool router generated by #[tool_router].
    tool_router: ToolRouter<GoDevServer>,
}

impl GoDevServer {
    /// Creates a server from loaded configuration.
    #[must_use]
    pub fn new(config: Config, allowed_tools: Option<HashSet<String>>) -> Self {
        Self {
            config: Arc::new(config),
            allowed_tools: allowed_tools.map(Arc::new),
            tool_router: Self::tool_router(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

// ─── Tool Implementations ────────────────────────────────────────────────────
// Each tool is registered in the generated ToolRouter via #[tool_router].

#[tool_router]
impl GoDevServer {
    #[tool(
        description = "Compile Go code. Provide raw source via 'code', a directory via \
        'project_path', both (hybrid: your code plus the project's go.mod/go.sum), or a \
        multi-module workspace via 'workspace_path' (workspace always wins when combined).\n\
        Supports buildTags and an explicit outputPath for the binary.",
        annotations(
            title = "Go Build",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn go_build(
        &self,
        Parameters(params): Parameters<tools::BuildParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let config = Arc::clone(&self.config);
        run_tool("go_build", async move {
            tools::execute_build(&config, params).await
        })
        .await
    }

    #[tool(
        description = "Compile and execute Go code, returning its stdout/stderr and exit \
        code. Program arguments go in 'args'; execution is bounded by timeoutSecs \
        (default 30). Sources resolve like go_build (code / project_path / hybrid / \
        workspace_path).",
        annotations(
            title = "Go Run",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn go_run(
        &self,
        Parameters(params): Parameters<tools::RunParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let config = Arc::clone(&self.config);
        run_tool("go_run", async move {
            tools::execute_run(&config, params).await
        })
        .await
    }

    #[tool(
        description = "Run Go tests (go test ./...). Options: verbose (-v), coverage \
        (-cover, summary extracted into the response), testPattern (-run). Pair 'code' \
        with 'testCode' to test a single in-memory file.",
        annotations(
            title = "Go Test",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn go_test(
        &self,
        Parameters(params): Parameters<tools::TestParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let config = Arc::clone(&self.config);
        run_tool("go_test", async move {
            tools::execute_test(&config, params).await
        })
        .await
    }

    #[tool(
        description = "Format Go code. Raw 'code' is formatted with gofmt and returned as \
        formattedCode with a codeChanged flag; project/workspace sources run go fmt in \
        place (optionally scoped to one workspace 'module').",
        annotations(
            title = "Go Format",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn go_fmt(
        &self,
        Parameters(params): Parameters<tools::FmtParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let config = Arc::clone(&self.config);
        run_tool("go_fmt", async move {
            tools::execute_fmt(&config, params).await
        })
        .await
    }

    #[tool(
        description = "Go module management. command is one of: init, tidy, vendor, \
        verify, why, graph, download; modulePath names the module for init. init and \
        tidy return the resulting go.mod as goModContent.",
        annotations(
            title = "Go Modules",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn go_mod(
        &self,
        Parameters(params): Parameters<tools::ModParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let config = Arc::clone(&self.config);
        run_tool("go_mod", async move {
            tools::execute_mod(&config, params).await
        })
        .await
    }

    #[tool(
        description = "Static analysis via go vet. Findings are returned as 'issues' in \
        the payload; the tool itself succeeds whenever the analysis could run. Scope a \
        workspace to one module with 'module'.",
        annotations(
            title = "Go Analyze",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn go_analyze(
        &self,
        Parameters(params): Parameters<tools::AnalyzeParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let config = Arc::clone(&self.config);
        run_tool("go_analyze", async move {
            tools::execute_analyze(&config, params).await
        })
        .await
    }

    #[tool(
        description = "Manage Go workspaces (go.work). command is one of: init (creates \
        the root if needed), use, sync, edit (returns the parsed configuration), vendor, \
        info (structured module listing). workspace_path is required; init/use take \
        'modules'.",
        annotations(
            title = "Go Workspace",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn go_workspace(
        &self,
        Parameters(params): Parameters<tools::WorkspaceParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let config = Arc::clone(&self.config);
        run_tool("go_workspace", async move {
            tools::execute_workspace(&config, params).await
        })
        .await
    }
}

// ─── ServerHandler Implementation ────────────────────────────────────────────
// Manual impl (no #[tool_handler]) so call_tool can carry the dispatch
// middleware: logging, authorization, and fuzzy tool-name remapping.
impl ServerHandler for GoDevServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = "go-dev-mcp: Go toolchain operations over MCP.\n\n\
             SOURCES (shared by go_build/go_run/go_test/go_fmt/go_mod/go_analyze):\n\
             - code: raw source, compiled in a throwaway module\n\
             - project_path: an existing project directory, used in place\n\
             - code + project_path: hybrid; your code plus the project's go.mod/go.sum\n\
             - workspace_path: a multi-module workspace; always wins over the others\n\n\
             WORKFLOW:\n\
             1. go_build / go_run -> compile and execute\n\
             2. go_test -> run tests (verbose/coverage/testPattern)\n\
             3. go_fmt / go_analyze -> clean up and vet\n\
             4. go_mod / go_workspace -> dependency and workspace management\n\n\
             Results are JSON envelopes: success, message, stdout, stderr, exitCode, \
             duration, errorDetails (parsed compiler diagnostics), nl_metadata."
            .to_string();

        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            server_info: Implementation {
                name: "go-dev-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(instructions),
        }
    }

    /// Dispatch middleware: wraps every tool call with logging, an
    /// optional allow-set check, and fuzzy tool-name remapping.
    async fn call_tool(
        &self,
        mut request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let requested = request.name.to_string();
        let start = std::time::Instant::now();

        // Fuzzy remap only when the requested name is not a registered
        // tool; the log always carries the pre-remap name.
        let nl = &self.config.nl_processing;
        if nl.enable_fuzzy_matching && self.tool_router.get(request.name.as_ref()).is_none() {
            if let Some(m) = dispatch::match_tool(&requested, nl.match_threshold) {
                tracing::info!(
                    requested = %requested,
                    matched = %m.tool_name,
                    score = m.score,
                    reason = m.reason,
                    "fuzzy tool name match"
                );
                request.name = m.tool_name.into();
            }
        }
        let resolved = request.name.to_string();

        if !dispatch::is_authorized(self.allowed_tools.as_deref(), &resolved) {
            tracing::warn!(tool = %resolved, "tool call rejected by allow-set");
            let outcome = Outcome::from_error(
                &resolved,
                &ServerError::Tool(format!("tool '{resolved}' is not authorized")),
            );
            let json = serde_json::to_string(&outcome)
                .map_err(|e| rmcp::ErrorData::internal_error(e.to_string(), None))?;
            return Ok(CallToolResult::error(vec![Content::text(json)]));
        }

        let tcc = ToolCallContext::new(self, request, context);
        let result = self.tool_router.call(tcc).await;

        let success = result
            .as_ref()
            .is_ok_and(|r| r.is_error != Some(true));
        tracing::info!(
            tool = %requested,
            resolved = %resolved,
            duration_ms = start.elapsed().as_millis() as u64,
            success,
            "tool call finished"
        );
        result
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::ErrorData> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }
}
