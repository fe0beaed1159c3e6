//! API route configuration.

use crate::api::handlers::{
    link_info_handler, recent_links_handler, shorten_handler, stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All JSON API routes, nested under `/api` by the top-level router.
///
/// # Endpoints
///
/// - `POST /shorten`       - Create a short link (or return the existing one)
/// - `GET  /urls`          - Most recent links (`?limit=N`, 1-100, default 10)
/// - `GET  /urls/{code}`   - A single link by code
/// - `GET  /stats`         - Aggregate totals
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls", get(recent_links_handler))
        .route("/urls/{code}", get(link_info_handler))
        .route("/stats", get(stats_handler))
}
