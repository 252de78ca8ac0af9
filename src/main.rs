//! Subpath — base path aware HTTP server
//!
//! Serves a small API behind a configurable URL prefix. Requests may carry
//! an additional space prefix (`/s/<id>`) that scopes the base path of that
//! single request.
//!
//! Usage:
//!   subpath                                      # Default port 5601, no base path
//!   subpath --base-path /kibana                  # A proxy strips /kibana
//!   subpath --base-path /kibana --rewrite-base-path
//!   subpath --port 0 --verbose                   # OS-assigned port, debug logs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use subpath_core::{DEFAULT_ROUTE, HttpConfig};
use subpath_server::{BasePathServer, ServerOptions};
use subpath_transport::{TransportConfig, TransportServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "subpath", about = "Subpath — base path aware HTTP server")]
struct Cli {
    /// Port to listen on (0 for OS-assigned)
    #[arg(long, default_value = "5601")]
    port: u16,

    /// Hostname to bind to
    #[arg(long, default_value = "127.0.0.1")]
    hostname: String,

    /// URL prefix the server is reachable under (e.g. /kibana)
    #[arg(long, env = "SUBPATH_BASE_PATH")]
    base_path: Option<String>,

    /// Strip the base path from inbound URLs here instead of in a proxy
    #[arg(long, env = "SUBPATH_REWRITE_BASE_PATH")]
    rewrite_base_path: bool,

    /// Where `/` redirects to, relative to the request's base path
    #[arg(long, default_value = DEFAULT_ROUTE)]
    default_route: String,

    /// Do not select spaces from `/s/<id>` URLs
    #[arg(long)]
    no_spaces: bool,

    /// Maximum concurrently dispatched requests (unlimited if not given)
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Allow cross-origin requests
    #[arg(long)]
    cors: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Write logs to a file (defaults to ~/.subpath/logs/server.log if no path given)
    #[arg(long, default_missing_value = "DEFAULT", num_args = 0..=1)]
    log_file: Option<String>,
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let Some(log_file_arg) = &cli.log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(());
    };

    let log_path = if log_file_arg == "DEFAULT" {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".subpath/logs/server.log")
    } else {
        PathBuf::from(log_file_arg)
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    eprintln!("Logging to {}", log_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = match (HttpConfig {
        base_path: cli.base_path.clone(),
        rewrite_base_path: cli.rewrite_base_path,
        default_route: cli.default_route.clone(),
    })
    .validated()
    {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let options = ServerOptions {
        enable_spaces: !cli.no_spaces,
        ..ServerOptions::default()
    };

    let server = Arc::new(BasePathServer::from_config(&config, &options));
    server.initialize();

    let transport_config = TransportConfig {
        port: cli.port,
        hostname: cli.hostname.clone(),
        enable_cors: cli.cors,
        max_in_flight: cli.max_in_flight,
    };

    let mut transport = TransportServer::start_shared(transport_config, server.clone())
        .await
        .context("starting HTTP transport")?;

    let base_path = config.base_path.as_deref().unwrap_or("");
    info!(
        port = transport.port(),
        base_path,
        rewrite_base_path = config.rewrite_base_path,
        spaces = options.enable_spaces,
        "Server running at http://{}:{}{}",
        cli.hostname,
        transport.port(),
        if config.rewrite_base_path { base_path } else { "" },
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl+C")?;

    info!("Shutting down...");
    server.shutdown();
    transport.stop().await;
    Ok(())
}
