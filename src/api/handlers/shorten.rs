//! Handler for link shortening endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::json;

use crate::api::dto::shorten::{LinkResponse, ShortenRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link, or returns the existing one for the same URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/page",
///   "custom_code": "my-link"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "url": {
///     "id": 1,
///     "original_url": "https://example.com/some/page",
///     "short_code": "my-link",
///     "visits": 0,
///     "created_at": "2026-01-01T12:00:00Z"
///   },
///   "short_url": "http://localhost:3000/my-link"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed body, an invalid URL, or a custom
/// code that is invalid or already in use.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;

    let link = state
        .link_service
        .create_short_url(&request.url, request.custom_code.as_deref())
        .await?;

    let short_url = state.short_url(&link.code);

    Ok(Json(LinkResponse {
        url: link,
        short_url,
    }))
}
