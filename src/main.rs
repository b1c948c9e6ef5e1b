//! Social gateway server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum + tower-http layers)
//!                        │
//!                        ▼
//!                     security::resolver ──▶ SecurityToken
//!                        │
//!                        ▼
//!                     rest::dispatcher
//!                        ├─ negotiation (input / output Format)
//!                        ├─ converter registry
//!                        ├─ descriptor (route-relative request)
//!                        └─ DataHandler (ServiceRouter)
//!                        │
//!     Client Response    ▼
//!     ◀────────────── output converter | errors::ErrorResponder
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use social_gateway::config::{load_config, GatewayConfig};
use social_gateway::lifecycle::{signals, Shutdown};
use social_gateway::observability::{logging, metrics};
use social_gateway::rest::ServiceRouter;
use social_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "social-gateway")]
#[command(about = "REST entry point for the social data API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("social-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_prefix = %config.rest.api_prefix(),
        debug = config.rest.debug,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse::<SocketAddr>()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // Data services are registered by the deployment; unknown routes answer 501.
    let services = ServiceRouter::new();
    tracing::info!(routes = ?services.routes(), "Data services registered");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(services));
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!(signalled = shutdown.is_triggered(), "Shutdown complete");
    Ok(())
}
