//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::application::workers::enqueue_visit;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Behaviour
///
/// - Known code: `307 Temporary Redirect` to the original URL, and a visit is
///   queued for the background worker. The response never waits on the count.
/// - Unknown code: `303 See Other` to the home page.
///
/// # Errors
///
/// Returns 500 if the lookup fails in the store.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    match state.link_service.get_url(&code).await {
        Ok(link) => {
            enqueue_visit(&state.visit_sender, &link.code);
            Ok(Redirect::temporary(&link.original_url).into_response())
        }
        Err(AppError::NotFound { .. }) => {
            tracing::debug!(code = %code, "Unknown short code, redirecting home");
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Validation { message, .. }) => {
            Err(AppError::internal(message, json!({ "code": code })))
        }
        Err(e) => Err(e),
    }
}
