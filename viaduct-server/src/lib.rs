//! Answer side of the viaduct tunnel: an HTTP signaling endpoint that
//! accepts one SDP offer per request, answers it (candidates gathered
//! to completion, no trickle), and bridges the resulting data channel
//! to an upstream TCP service, typically a VNC server.

mod config;
mod session;
mod signaling;
mod upstream;

pub use config::ServerConfig;
pub use session::{OfferError, SessionRegistry, TunnelSession};
pub use signaling::{AppState, router};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Bind and serve the signaling endpoint until interrupted, then close
/// every live session.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let registry = SessionRegistry::new();
    let state = AppState {
        config: Arc::new(config.clone()),
        registry: registry.clone(),
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(
        "listening on {}, bridging tunnels to {}",
        config.listen_addr, config.upstream_addr
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("signaling server failed")?;

    registry.close_all().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
