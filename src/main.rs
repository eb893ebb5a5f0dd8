//! Storefront - e-commerce backend with real-time product updates.
//!
//! Parses configuration, opens the store, and serves the HTTP, view and
//! WebSocket surface until Ctrl+C or SIGTERM.

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use server::{ServerState, create_app};
use storage::Store;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_args(args);
    if config.ephemeral_secret {
        warn!("no session secret configured, sessions will not survive a restart");
    }
    if config.storage.is_memory() {
        warn!("no database path configured, using an in-memory store");
    }

    let store = Store::new(config.storage.clone()).context("failed to open document store")?;
    let state = ServerState::new(Arc::new(store), config.state.clone());
    let app = create_app(state);

    let address = config.server.bind_addr();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
