//! Handler for aggregate statistics.

use axum::{Json, extract::State};

use crate::domain::entities::Stats;
use crate::error::AppError;
use crate::state::AppState;

/// Returns totals over all links.
///
/// # Endpoint
///
/// `GET /api/stats`
///
/// # Response
///
/// ```json
/// {
///   "total_urls": 42,
///   "total_visits": 1337,
///   "last_created": "2026-01-01T12:00:00Z"
/// }
/// ```
///
/// `last_created` is omitted when there are no links.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<Stats>, AppError> {
    let stats = state.link_service.get_stats().await?;
    Ok(Json(stats))
}
