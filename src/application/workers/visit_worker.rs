//! Background visit counting.
//!
//! Redirects hand a [`VisitEvent`] to a bounded channel and return at once; the
//! worker drains the channel and applies each increment through [`LinkService`].

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkStore;
use crate::domain::visit_event::VisitEvent;
use crate::error::AppError;

/// Queues a visit for `code` without waiting.
///
/// Returns `false` if the event was dropped because the queue is full or the
/// worker has already shut down. Dropping is logged and counted; the caller's
/// redirect proceeds either way.
pub fn enqueue_visit(sender: &mpsc::Sender<VisitEvent>, code: &str) -> bool {
    match sender.try_send(VisitEvent::new(code)) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(event)) => {
            tracing::warn!(code = %event.code, "Visit queue full, dropping visit");
            metrics::counter!("visits_dropped_total").increment(1);
            false
        }
        Err(mpsc::error::TrySendError::Closed(event)) => {
            tracing::warn!(code = %event.code, "Visit worker stopped, dropping visit");
            metrics::counter!("visits_dropped_total").increment(1);
            false
        }
    }
}

/// Applies queued visit increments until the channel closes.
///
/// At most `concurrency` increments run at once. After the last sender is
/// dropped, in-flight increments are awaited before this returns.
pub async fn run_visit_worker<S>(
    mut rx: mpsc::Receiver<VisitEvent>,
    service: Arc<LinkService<S>>,
    concurrency: usize,
) where
    S: LinkStore + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    tracing::info!(concurrency, "Visit worker started");

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let service = service.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            record_visit(&service, &event.code).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    let pending = in_flight.len();
    while in_flight.join_next().await.is_some() {}

    tracing::info!(pending, "Visit worker drained");
}

async fn record_visit<S: LinkStore>(service: &LinkService<S>, code: &str) {
    match service.increment_visits(code).await {
        Ok(()) => {
            metrics::counter!("visits_recorded_total").increment(1);
        }
        // Swept between the redirect and the increment.
        Err(AppError::NotFound { .. }) => {
            tracing::debug!(code = %code, "Visit for missing link ignored");
        }
        Err(e) => {
            tracing::error!(code = %code, error = %e, "Failed to record visit");
            metrics::counter!("visits_failed_total").increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_worker_applies_every_event() {
        let mut mock_store = MockLinkStore::new();
        mock_store
            .expect_increment_visits()
            .withf(|code| code == "abc123")
            .times(5)
            .returning(|_| Ok(()));

        let service = Arc::new(LinkService::new(Arc::new(mock_store)));
        let (tx, rx) = mpsc::channel(16);

        for _ in 0..5 {
            assert!(enqueue_visit(&tx, "abc123"));
        }
        drop(tx);

        run_visit_worker(rx, service, 2).await;
    }

    #[tokio::test]
    async fn test_worker_continues_after_failures() {
        let mut mock_store = MockLinkStore::new();
        mock_store
            .expect_increment_visits()
            .times(3)
            .returning(|code| match code {
                "gone" => Err(AppError::not_found("Short link not found", json!({}))),
                "broken" => Err(AppError::database("Database error", json!({}))),
                _ => Ok(()),
            });

        let service = Arc::new(LinkService::new(Arc::new(mock_store)));
        let (tx, rx) = mpsc::channel(16);

        enqueue_visit(&tx, "gone");
        enqueue_visit(&tx, "broken");
        enqueue_visit(&tx, "fine");
        drop(tx);

        run_visit_worker(rx, service, 1).await;
    }

    #[tokio::test]
    async fn test_enqueue_drops_when_full() {
        let (tx, _rx) = mpsc::channel(1);

        assert!(enqueue_visit(&tx, "first"));
        assert!(!enqueue_visit(&tx, "second"));
    }

    #[tokio::test]
    async fn test_enqueue_drops_when_closed() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);

        assert!(!enqueue_visit(&tx, "late"));
    }

    #[tokio::test]
    async fn test_worker_returns_when_channel_closed_empty() {
        let service = Arc::new(LinkService::new(Arc::new(MockLinkStore::new())));
        let (tx, rx) = mpsc::channel::<VisitEvent>(4);
        drop(tx);

        run_visit_worker(rx, service, 4).await;
    }
}
