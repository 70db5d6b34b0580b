//! Rolegate - user/role authentication layer for web APIs

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LogFormat, LoggingConfig};
use rolegate_api::{AppState, create_router};
use rolegate_db::Database;

/// Rolegate - JWT verification and role-based authorization
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "ROLEGATE_CONFIG", default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "ROLEGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "ROLEGATE_PORT")]
    port: Option<u16>,

    /// Shared secret used to verify tokens
    #[arg(long, env = "ROLEGATE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    init_logging(&config.logging);

    info!("Starting Rolegate v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_default_secret() {
        warn!("Using the default JWT secret; set auth.jwt_secret or ROLEGATE_JWT_SECRET");
    }

    // Create the database directory
    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let db = Database::connect(&config.database.url(), config.database.max_connections)
        .await
        .context("Failed to open database")?;

    // Seed before accepting traffic
    if config.seed.enabled {
        db.seed(&config.seed.data)
            .await
            .context("Failed to seed database")?;
    }

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install metrics recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    let state = AppState::new(db.clone(), &config.auth.jwt_secret);

    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;
    served?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
