//! Response hardening: panic recovery, security headers, compression and CORS.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// Headers added to every response unless the handler already set them.
const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::X_XSS_PROTECTION, "0"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
];

/// Wraps `router` with the hardening layers.
///
/// From outermost to innermost:
///
/// - panic recovery: a panicking handler becomes `500 Internal Server Error`
/// - security headers (see [`SECURITY_HEADERS`])
/// - CORS: any origin, `GET`, `POST` and `OPTIONS`
/// - gzip compression, negotiated from `Accept-Encoding`
pub fn apply(router: Router) -> Router {
    let router = router
        .layer(CompressionLayer::new().gzip(true))
        .layer(cors());

    let router = SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                name,
                HeaderValue::from_static(value),
            ))
        });

    router.layer(CatchPanicLayer::new())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
