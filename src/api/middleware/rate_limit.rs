//! Per-client rate limiting using the token bucket algorithm.

use anyhow::{Context, Result};
use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Applies a rate limiter allowing `requests` per `window` for each client IP.
///
/// The bucket holds `requests` tokens and refills one token every
/// `window / requests`, so a client that has been idle for a full window can
/// burst up to the limit. Requests exceeding the limit receive
/// `429 Too Many Requests`.
///
/// # Key Extraction
///
/// - `behind_proxy = false`: the socket peer address, which cannot be spoofed
/// - `behind_proxy = true`: `X-Forwarded-For`, `X-Real-IP` or `Forwarded`,
///   falling back to the peer address
///
/// Either way the router must be served with connect info.
///
/// # Errors
///
/// Returns an error if `requests` is zero or the refill period rounds to zero.
///
/// # Example
///
/// ```rust,ignore
/// let app = rate_limit::apply(router, 100, Duration::from_secs(60), false)?;
/// ```
pub fn apply(
    router: Router,
    requests: u32,
    window: Duration,
    behind_proxy: bool,
) -> Result<Router> {
    let router = if behind_proxy {
        router.layer(layer(SmartIpKeyExtractor, requests, window)?)
    } else {
        router.layer(layer(PeerIpKeyExtractor, requests, window)?)
    };

    Ok(router)
}

fn layer<K: KeyExtractor>(
    extractor: K,
    requests: u32,
    window: Duration,
) -> Result<GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>> {
    anyhow::ensure!(requests > 0, "rate limit must allow at least one request");

    let period = window / requests;

    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(extractor)
        .period(period)
        .burst_size(requests)
        .finish()
        .with_context(|| {
            format!(
                "invalid rate limit: {requests} requests per {}s",
                window.as_secs()
            )
        })?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}
