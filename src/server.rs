//! HTTP server initialization and runtime setup.
//!
//! Handles the store connection, background workers, and the Axum server
//! lifecycle including ordered shutdown.

use crate::application::services::LinkService;
use crate::application::workers::{RetentionSweeper, run_visit_worker};
use crate::config::Config;
use crate::domain::repositories::LinkStore;
use crate::infrastructure::persistence::SqliteLinkStore;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Upper bound on draining queued visits after the server stops.
const VISIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - SQLite connection pool and migrations
/// - Background visit worker
/// - Retention sweeper
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections and finishes
/// in-flight requests, then the sweeper is stopped, queued visits are drained,
/// and the store is closed, in that order.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = Arc::new(
        SqliteLinkStore::connect(&config.store_options())
            .await
            .context("Failed to open link store")?,
    );
    tracing::info!("Connected to database");

    let link_service = Arc::new(
        LinkService::new(store.clone()).with_operation_timeout(config.store_timeout()),
    );

    let (visit_tx, visit_rx) = mpsc::channel(config.visit_queue_capacity);
    let visit_worker = tokio::spawn(run_visit_worker(
        visit_rx,
        link_service.clone(),
        config.visit_worker_concurrency,
    ));

    let mut sweeper = RetentionSweeper::start(store.clone(), config.sweeper_config());

    let state = AppState::new(
        store.clone(),
        link_service,
        visit_tx,
        config.base_url.clone(),
    );

    let app = app_router(state, &config)?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    tracing::info!("HTTP server stopped, shutting down background work");

    sweeper.stop().await;

    // The router owned the last visit sender; the worker drains and exits.
    let mut visit_worker = visit_worker;
    match tokio::time::timeout(VISIT_DRAIN_TIMEOUT, &mut visit_worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Visit worker panicked"),
        Err(_) => {
            tracing::warn!(
                timeout_secs = VISIT_DRAIN_TIMEOUT.as_secs(),
                "Visit worker did not drain in time, aborting"
            );
            visit_worker.abort();
        }
    }

    store.close().await;
    tracing::info!("Shutdown complete");

    served.context("Server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
