//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`  - Short link redirect
//! - `GET  /health`  - Health check: database and visit queue
//! - `/api/*`        - JSON API
//! - everything else - Static files from `./static` (home page at `/`)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client token bucket (configurable for proxy deployments)
//! - **Hardening** - Panic recovery, security headers, CORS and gzip
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{hardening, rate_limit, tracing};
use crate::config::Config;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use axum::routing::get;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Directory served as the router fallback.
pub const STATIC_DIR: &str = "static";

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting keys on the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Errors
///
/// Returns an error if the rate limit settings are invalid.
pub fn app_router(state: AppState, config: &Config) -> Result<NormalizePath<Router>> {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .fallback_service(ServeDir::new(STATIC_DIR))
        .with_state(state);

    let router = rate_limit::apply(
        router,
        config.rate_limit,
        Duration::from_secs(config.rate_limit_window_secs),
        config.behind_proxy,
    )?;
    let router = hardening::apply(router).layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}
