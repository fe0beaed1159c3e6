//! Handlers for single-link lookup and recent links listing.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::links::{RecentLinksParams, RecentLinksResponse};
use crate::api::dto::shorten::LinkResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns a single link with its short URL.
///
/// # Endpoint
///
/// `GET /api/urls/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist.
pub async fn link_info_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_url(&code).await?;
    let short_url = state.short_url(&link.code);

    Ok(Json(LinkResponse {
        url: link,
        short_url,
    }))
}

/// Lists the most recently created links, newest first.
///
/// # Endpoint
///
/// `GET /api/urls?limit=N`
///
/// `N` outside `1..=100` or not a number falls back to 10.
pub async fn recent_links_handler(
    State(state): State<AppState>,
    Query(params): Query<RecentLinksParams>,
) -> Result<Json<RecentLinksResponse>, AppError> {
    let links = state
        .link_service
        .get_recent_urls(Some(params.effective_limit()))
        .await?;

    let urls = links
        .into_iter()
        .map(|link| LinkResponse {
            short_url: state.short_url(&link.code),
            url: link,
        })
        .collect();

    Ok(Json(RecentLinksResponse { urls }))
}
