//! Local web front end: one form, recomputed on every change.

pub mod routes;
pub mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::application::system::Application;
use routes::{AppState, build_router};

/// Serves the form until Ctrl+C. Opens the default browser on the served
/// page when `open_browser` is set.
pub async fn run_server(app: Application, open_browser: bool) -> Result<()> {
    let address = app.config.server.bind_address();
    let router = build_router(Arc::new(AppState::from_application(&app)));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    let url = browser_url(listener.local_addr()?);
    info!("Serving price form at {}", url);

    if open_browser && let Err(e) = open::that(&url) {
        warn!("Could not open browser: {}", e);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received. Exiting...");
        })
        .await
        .context("Web server failed")?;
    Ok(())
}

/// A wildcard bind address is not something a browser can open.
fn browser_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://127.0.0.1:{}", addr.port())
    } else {
        format!("http://{}", addr)
    }
}
