//! Short link entity representing a stored code → URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted mapping from a short code to its original URL.
///
/// `visits` only ever grows while the record exists, and `created_at` is fixed
/// at insertion. Records disappear only through the retention sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ShortLink {
    pub id: i64,
    pub original_url: String,
    #[serde(rename = "short_code")]
    pub code: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: i64,
        original_url: String,
        code: String,
        visits: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_url,
            code,
            visits,
            created_at,
        }
    }
}

/// Input data for inserting a new short link.
///
/// The store assigns `id`; `visits` always starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl NewShortLink {
    pub fn new(code: String, original_url: String) -> Self {
        Self {
            code,
            original_url,
            created_at: Utc::now(),
        }
    }

    /// Builds the stored record once the store has assigned an id.
    pub fn into_short_link(self, id: i64) -> ShortLink {
        ShortLink::new(id, self.original_url, self.code, 0, self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_creation() {
        let now = Utc::now();
        let link = ShortLink::new(
            1,
            "https://example.com".to_string(),
            "abc123".to_string(),
            0,
            now,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.code, "abc123");
        assert_eq!(link.original_url, "https://example.com");
        assert_eq!(link.visits, 0);
        assert_eq!(link.created_at, now);
    }

    #[test]
    fn test_new_short_link_into_record() {
        let new_link =
            NewShortLink::new("xyz789".to_string(), "https://rust-lang.org".to_string());
        let created_at = new_link.created_at;

        let link = new_link.into_short_link(42);

        assert_eq!(link.id, 42);
        assert_eq!(link.code, "xyz789");
        assert_eq!(link.visits, 0);
        assert_eq!(link.created_at, created_at);
    }

    #[test]
    fn test_serializes_code_as_short_code() {
        let link = ShortLink::new(
            7,
            "https://example.com".to_string(),
            "abcd".to_string(),
            2,
            Utc::now(),
        );

        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["short_code"], "abcd");
        assert_eq!(json["original_url"], "https://example.com");
        assert_eq!(json["visits"], 2);
        assert!(json.get("code").is_none());
    }
}
