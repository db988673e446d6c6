use anyhow::Context;
use clap::Parser;
use directory_server::{bootstrap, create_app};
use logger_redacted::init_logging;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

/// User directory HTTP server
#[derive(Parser, Debug)]
#[command(name = "directory-server")]
#[command(about = "User directory HTTP API server")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "directory.yaml")]
    config: PathBuf,

    /// Server bind address, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Server port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = config_engine::load(Some(&args.config))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.verbose {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.storage.backend,
        "Starting directory server"
    );

    if let Some(port) = config.server.metrics_port {
        telemetry::install_prometheus_exporter(SocketAddr::from(([0, 0, 0, 0], port)))?;
    }

    let runtime = bootstrap::build(&config).await?;
    let app = create_app(runtime.state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(addr = %addr, "Directory server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    runtime.shutdown().await;
    info!("Directory server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
