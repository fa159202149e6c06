//! go-dev-mcp: MCP server for Go toolchain operations.
//!
//! Usage:
//!   go-dev-mcp --mcp                    # Start MCP server (stdio)
//!   go-dev-mcp build --project <path>   # CLI build mode
//!   go-dev-mcp test --project <path>    # CLI test mode
//!   go-dev-mcp workspace <path>         # Workspace info

use clap::{Parser, Subcommand};
use go_dev_mcp::config::Config;
use go_dev_mcp::input::SourceParams;
use go_dev_mcp::server::GoDevServer;
use go_dev_mcp::{fmt, tools};
use rmcp::ServiceExt;
use std::collections::HashSet;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "go-dev-mcp")]
#[command(about = "MCP server exposing Go toolchain operations")]
#[command(version)]
struct Cli {
    /// Run as MCP server (stdin/stdout JSON-RPC)
    #[arg(long)]
    mcp: bool,

    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restrict the server to these tools (comma separated)
    #[arg(long, value_delimiter = ',')]
    allow_tools: Option<Vec<String>>,

    /// Print raw JSON instead of formatted output (CLI mode)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a project
    Build {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Build tags (comma separated)
        #[arg(long)]
        tags: Option<String>,

        /// Output path for the binary
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run tests in a project
    Test {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Verbose test output
        #[arg(short, long)]
        verbose: bool,

        /// Collect coverage statistics
        #[arg(short, long)]
        coverage: bool,

        /// Run only tests matching this pattern
        #[arg(long)]
        run: Option<String>,
    },

    /// Format a project in place
    Fmt {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Vet a project
    Vet {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Show workspace structure
    Workspace {
        /// Workspace root
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // CRITICAL: Log to stderr only (stdout is JSON-RPC for MCP)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("go_dev_mcp=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.mcp {
        let allowed = cli
            .allow_tools
            .map(|tools| tools.into_iter().collect::<HashSet<_>>());
        run_mcp_server(config, allowed).await
    } else if let Some(cmd) = cli.command {
        run_cli(config, cmd, cli.json).await
    } else {
        eprintln!("Use --mcp to start the MCP server, or a subcommand for CLI mode.");
        eprintln!("Run with --help for more information.");
        std::process::exit(1);
    }
}

async fn run_mcp_server(config: Config, allowed: Option<HashSet<String>>) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server");

    let server = GoDevServer::new(config, allowed);

    // Run the MCP server on stdin/stdout
    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

fn project_params(project: &PathBuf) -> SourceParams {
    SourceParams {
        project_path: Some(project.display().to_string()),
        ..Default::default()
    }
}

async fn run_cli(config: Config, cmd: Commands, json: bool) -> anyhow::Result<()> {
    let color = !json && std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout().lock();

    match cmd {
        Commands::Build {
            project,
            tags,
            output,
        } => {
            let params = tools::BuildParams {
                source: project_params(&project),
                build_tags: tags,
                output_path: output,
                timeout_secs: None,
            };
            let out = tools::execute_build(&config, params).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                fmt::fmt_build(&mut stdout, &out, color)?;
            }
            if !out.outcome.success {
                std::process::exit(1);
            }
        }

        Commands::Test {
            project,
            verbose,
            coverage,
            run,
        } => {
            let params = tools::TestParams {
                source: project_params(&project),
                verbose,
                coverage,
                test_pattern: run,
                timeout_secs: None,
            };
            let out = tools::execute_test(&config, params).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                fmt::fmt_test(&mut stdout, &out, color)?;
            }
            if !out.outcome.success {
                std::process::exit(1);
            }
        }

        Commands::Fmt { project } => {
            let params = tools::FmtParams {
                source: project_params(&project),
                module: None,
                timeout_secs: None,
            };
            let out = tools::execute_fmt(&config, params).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", out.outcome.message);
            }
            if !out.outcome.success {
                std::process::exit(1);
            }
        }

        Commands::Vet { project } => {
            let params = tools::AnalyzeParams {
                source: project_params(&project),
                vet: true,
                module: None,
                timeout_secs: None,
            };
            let out = tools::execute_analyze(&config, params).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                fmt::fmt_vet(&mut stdout, &out, color)?;
            }
        }

        Commands::Workspace { path } => {
            let params = tools::WorkspaceParams {
                command: "info".to_string(),
                workspace_path: path.display().to_string(),
                modules: Vec::new(),
                timeout_secs: None,
            };
            let out = tools::execute_workspace(&config, params).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                fmt::fmt_workspace(&mut stdout, &out, color)?;
            }
            if !out.outcome.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
