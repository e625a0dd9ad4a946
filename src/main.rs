//! Swap Orchestrator - form-driven native transfers with a durable history
//!
//! Keeps two linked numeric swap fields in sync, submits transfers
//! through a retrying submission path, and records every outcome in an
//! append-only JSON ledger.

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

mod api;
mod chain;
mod config;
mod engine;
mod error;
mod ledger;
mod metrics;
mod submit;
mod sync;

use config::Settings;
use engine::SwapEngine;
use ledger::Ledger;
use metrics::MetricsServer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    info!("Starting Swap Orchestrator v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;

    // Recover the swap history
    let ledger = Ledger::load(settings.ledger.path.clone()).await;
    info!("Ledger loaded with {} records", ledger.len().await);
    metrics::record_ledger_records(ledger.len().await);

    // Wire up the configured chain backend
    let backends = chain::build_backends(&settings.chain)?;
    let engine = Arc::new(SwapEngine::new(
        backends,
        ledger,
        settings.orchestrator.max_attempts,
    ));

    // Initialize metrics server
    let metrics_server = if settings.metrics.enabled {
        Some(MetricsServer::new(settings.metrics.port))
    } else {
        None
    };

    // Start API server
    let api_handle = tokio::spawn({
        let api_config = settings.api.clone();
        let engine = engine.clone();
        async move {
            if let Err(e) = api::run_server(api_config, engine).await {
                error!("API server error: {}", e);
            }
        }
    });

    // Start metrics server
    let metrics_handle = if let Some(server) = metrics_server {
        Some(tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Metrics server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Swap Orchestrator is running");
    info!("API server: http://{}:{}", settings.api.host, settings.api.port);
    if settings.metrics.enabled {
        info!("Metrics: http://0.0.0.0:{}/metrics", settings.metrics.port);
    }

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutdown signal received, stopping...");

    api_handle.abort();
    if let Some(h) = metrics_handle {
        h.abort();
    }

    info!("Swap Orchestrator stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,swap_orchestrator=debug,hyper=warn,ethers=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
