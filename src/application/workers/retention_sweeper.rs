//! Background retention sweeper.
//!
//! Deletes short links older than a configured age on a fixed interval. The
//! first sweep happens one full interval after start.
//!
//! Each run is bounded by its own timeout. A failed or timed-out run is logged
//! and counted; the next tick runs normally.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::repositories::LinkStore;

/// Configuration for the retention sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between sweeps (default: 24h)
    pub interval: Duration,

    /// Links created longer ago than this are deleted (default: 30 days)
    pub max_age: Duration,

    /// Upper bound on a single sweep (default: 60s)
    pub run_timeout: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            max_age: Duration::from_secs(30 * 24 * 60 * 60),
            run_timeout: Duration::from_secs(60),
        }
    }
}

/// Handle to the running sweeper task.
///
/// [`RetentionSweeper::stop`] must be awaited to guarantee no sweep is still
/// running. Dropping the handle only signals the task.
#[derive(Debug)]
pub struct RetentionSweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl RetentionSweeper {
    /// Spawns the sweeper loop on the current runtime.
    pub fn start<S>(store: Arc<S>, config: SweeperConfig) -> Self
    where
        S: LinkStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tracing::info!(
            interval_secs = config.interval.as_secs(),
            max_age_secs = config.max_age.as_secs(),
            "Retention sweeper started"
        );

        let handle = tokio::spawn(sweeper_loop(store, config, shutdown_rx));

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stops the sweeper and waits for its task to exit.
    ///
    /// A sweep in progress is cancelled. Calling this more than once is a no-op.
    pub async fn stop(&mut self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Retention sweeper task panicked");
            }
            tracing::info!("Retention sweeper stopped");
        }
    }

    /// Returns true until [`RetentionSweeper::stop`] has completed.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RetentionSweeper {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn sweeper_loop<S: LinkStore>(
    store: Arc<S>,
    config: SweeperConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown_rx.changed() => {
                tracing::debug!("Retention sweeper received shutdown signal");
                return;
            }
        }

        tokio::select! {
            _ = sweep_once(store.as_ref(), &config) => {}
            _ = shutdown_rx.changed() => {
                tracing::warn!("Retention sweep cancelled by shutdown");
                return;
            }
        }
    }
}

/// Runs one bounded sweep. Returns the number of deleted links on success.
pub async fn sweep_once<S: LinkStore + ?Sized>(store: &S, config: &SweeperConfig) -> Option<u64> {
    metrics::counter!("sweeps_total").increment(1);

    match tokio::time::timeout(config.run_timeout, store.delete_older_than(config.max_age)).await {
        Ok(Ok(deleted)) => {
            metrics::counter!("links_swept_total").increment(deleted);
            tracing::info!(deleted, "Retention sweep completed");
            Some(deleted)
        }
        Ok(Err(e)) => {
            metrics::counter!("sweep_failures_total").increment(1);
            tracing::error!(error = %e, "Retention sweep failed");
            None
        }
        Err(_) => {
            metrics::counter!("sweep_failures_total").increment(1);
            tracing::error!(
                timeout_secs = config.run_timeout.as_secs(),
                "Retention sweep timed out"
            );
            None
        }
    }
}
