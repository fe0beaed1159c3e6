//! Shared state injected into every HTTP handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::LinkService;
use crate::domain::visit_event::VisitEvent;
use crate::infrastructure::persistence::SqliteLinkStore;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<SqliteLinkStore>>,
    /// Direct store handle for health checks.
    pub store: Arc<SqliteLinkStore>,
    pub visit_sender: mpsc::Sender<VisitEvent>,
    /// Public prefix for fully-qualified short URLs.
    pub base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<SqliteLinkStore>,
        link_service: Arc<LinkService<SqliteLinkStore>>,
        visit_sender: mpsc::Sender<VisitEvent>,
        base_url: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            link_service,
            store,
            visit_sender,
            base_url: base_url.into(),
        }
    }

    /// Builds the fully-qualified short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        self.link_service.short_url(&self.base_url, code)
    }
}
