//! ArmLink - Salesforce to HUD ARM reporting bridge
//!
//! Main entry point for the HTTP server.

use anyhow::Context;
use armlink_api::utils::logging::{self, LogFormat};
use armlink_api::{router, AppContext};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so it can set the log format and filter
    let dotenv = dotenvy::dotenv();
    logging::init(LogFormat::from_env()).context("failed to install tracing subscriber")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => warn!(error = %e, "No .env file loaded"),
    }

    let config = armlink_infra::config::load().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();
    let ctx = AppContext::new(config).context("failed to initialize application context")?;

    let listener =
        TcpListener::bind(&bind_addr).await.with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "ArmLink listening");

    let shutdown_ctx = ctx.clone();
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
            shutdown_ctx.shutdown();
        })
        .await
        .context("server error")?;

    Ok(())
}
