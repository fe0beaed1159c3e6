//! Query parameters and responses for link listing.

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, serde_as};

use super::shorten::LinkResponse;

/// Page size used when `limit` is missing, unparsable, or out of range.
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Largest accepted `limit`.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Query parameters for `GET /api/urls`.
///
/// A malformed `limit` deserializes to `None` instead of rejecting the request.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct RecentLinksParams {
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

impl RecentLinksParams {
    /// Returns the effective limit in `1..=100`, defaulting to 10.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .filter(|l| (1..=MAX_LIST_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct RecentLinksResponse {
    pub urls: Vec<LinkResponse>,
}
