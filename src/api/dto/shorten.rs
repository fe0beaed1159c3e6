//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::entities::ShortLink;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    /// The URL to shorten; `http://` is assumed when no scheme is given.
    pub url: String,

    /// Optional custom short code (4-12 characters from `[A-Za-z0-9_-]`).
    #[serde(default)]
    pub custom_code: Option<String>,
}

/// A link together with its fully-qualified short URL.
///
/// Returned by the shorten endpoint, the single-link lookup, and as each
/// element of the recent-links listing.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: ShortLink,
    pub short_url: String,
}
