//! Atlassian MCP server entry point.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use atlassian_mcp::context::ServerContext;
use atlassian_mcp::protocol::ProtocolHandler;
use atlassian_mcp::tools::ToolRegistry;
use atlassian_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "mcp-atlassian",
    about = "MCP server for Confluence and Jira: spaces, pages, projects and issues for LLM clients",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP.
    #[cfg(feature = "http")]
    ServeHttp {
        /// Listen address (host:port). Also reads MCP_HTTP_ADDR.
        #[arg(long)]
        addr: Option<String>,

        /// Bearer token for authentication.
        /// Also reads from MCP_AUTH_TOKEN env var.
        #[arg(long)]
        token: Option<String>,

        /// Requests dispatched concurrently. Also reads MCP_HTTP_WORKERS.
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   mcp-atlassian completions bash > ~/.local/share/bash-completion/completions/mcp-atlassian
    ///   mcp-atlassian completions zsh > ~/.zfunc/_mcp-atlassian
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout carries the stdio protocol, so logs always go to stderr.
    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Load .env first so RUST_LOG set there is honored.
    let dotenv = dotenvy::dotenv();
    init_logging(&cli.log_level, cli.log_format);

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let context = ServerContext::from_env()?;
            let handler = ProtocolHandler::new(context);
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        #[cfg(feature = "http")]
        Commands::ServeHttp {
            addr,
            token,
            workers,
        } => {
            use atlassian_mcp::transport::HttpTransport;

            let addr = atlassian_mcp::resolve_http_addr(addr.as_deref());
            let token = atlassian_mcp::resolve_auth_token(token);
            let workers = atlassian_mcp::resolve_http_workers(workers);

            let context = ServerContext::from_env()?;
            let handler = ProtocolHandler::new(context);

            tracing::info!(workers, "Atlassian MCP server (HTTP)");
            if token.is_some() {
                tracing::info!("Auth: bearer token required");
            }

            let transport = HttpTransport::start(handler, token, workers).await;
            transport.run(&addr).await?;
        }

        Commands::Info => {
            let capabilities = atlassian_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mcp-atlassian", &mut std::io::stdout());
        }
    }

    Ok(())
}
