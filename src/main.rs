//! Authorization filter pipeline sample service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request-id ─▶ trace ─▶ timeout ─▶ route match
//!                                                          │
//!                                                          ▼
//!                                            ┌───────────────────────────┐
//!                                            │   FilterPipeline          │
//!                                            │   action: executing       │
//!                                            │   authorization stages ───┼──▶ 403 (short-circuit)
//!                                            │   handler                 │
//!                                            │   action: executed        │
//!                                            └─────────────┬─────────────┘
//!     Client Response                                      │
//!     ◀────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use authz_filters::config::{load_config, AppConfig};
use authz_filters::observability::{logging, metrics};
use authz_filters::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "authz-filters")]
#[command(about = "Authorization filter pipeline sample service", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("authz-filters v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        policy = ?config.policy.mode,
        logging_filter = config.filters.logging_enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
