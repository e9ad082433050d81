//! # pgbr Server Entry Point
//!
//! Parses configuration, opens the storage root (refusing to start if it is
//! missing), and serves the API until Ctrl-C or SIGTERM.

use anyhow::Context;
use clap::Parser;
use pgbr_api::config::ServerConfig;
use pgbr_api::AppState;
use pgbr_core::ArtifactStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    config.init_tracing();

    let store = ArtifactStore::open(&config.backup_path)
        .context("refusing to start without a usable backup path")?;

    let mut state = AppState::new(store);
    if !config.no_metrics {
        let handle = pgbr_api::metrics::install().context("failed to install metrics recorder")?;
        state = state.with_metrics(handle);
    }

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %config.bind,
        backup_path = %config.backup_path.display(),
        "pgbr listening"
    );

    axum::serve(listener, pgbr_api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("pgbr stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
