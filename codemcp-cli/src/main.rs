use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "codemcp")]
#[command(about = "MCP gateway for remote code execution")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the MCP gateway on stdio (default if no subcommand provided)
    Serve {
        /// Execution endpoint URL (overrides GCF_URL and the config file)
        #[arg(short = 'u', long)]
        endpoint_url: Option<String>,

        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run the HTTP execution endpoint locally
    Endpoint {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Deploy the execution endpoint as a Google Cloud Function
    Deploy {
        /// Google Cloud project ID (defaults to the current gcloud config)
        #[arg(long)]
        project: Option<String>,

        /// Directory containing the function source
        #[arg(short, long, default_value = "./gcf")]
        source: PathBuf,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            endpoint_url,
            config,
            verbose,
        }) => run_serve(endpoint_url, config, verbose).await,
        Some(Commands::Endpoint {
            host,
            port,
            verbose,
        }) => run_endpoint(host, port, verbose).await,
        Some(Commands::Deploy {
            project,
            source,
            verbose,
        }) => run_deploy(project, source, verbose).await,
        None => {
            // Default to serve
            run_serve(None, None, false).await
        }
    }
}

async fn run_serve(
    endpoint_url: Option<String>,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    use codemcp_gateway::{GatewayConfig, McpServer};

    // Stdout carries protocol frames, so logs go to stderr and a file
    let log_level = if verbose { "debug" } else { "info" };

    let file_appender = tracing_appender::rolling::never(".", "codemcp.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "codemcp={},codemcp_gateway={},codemcp_deploy={}",
                    log_level, log_level, log_level
                ))
            }),
        )
        .init();

    let config = GatewayConfig::resolve(endpoint_url, config_path.as_deref())?;
    match &config.endpoint_url {
        Some(url) => info!("Execution endpoint: {}", url),
        None => info!("No execution endpoint configured, will deploy on first use"),
    }

    let server = McpServer::new(&config);
    server.run_stdio().await
}

async fn run_endpoint(host: String, port: u16, verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "codemcp={},codemcp_endpoint={}",
                    log_level, log_level
                ))
            }),
        )
        .init();

    let bind_addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting execution endpoint on {}", bind_addr);
    codemcp_endpoint::serve(bind_addr).await
}

async fn run_deploy(project: Option<String>, source: PathBuf, verbose: bool) -> Result<()> {
    use codemcp_deploy::Deployer;

    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("codemcp_deploy={}", log_level))
            }),
        )
        .init();

    println!("Deploying code interpreter Cloud Function...");

    match Deployer::new(project, source).deploy().await {
        Ok(report) => {
            println!("✓ Successfully deployed");
            println!("Function URL: {}", report.function_url);
            println!("Project ID: {}", report.project_id);
            println!("\nTo use with the MCP gateway, set the environment variable:");
            println!("export GCF_URL=\"{}\"", report.function_url);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Deployment failed: {}", e);
            std::process::exit(1);
        }
    }
}
