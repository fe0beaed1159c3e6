//! Aggregate statistics over all stored links.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Totals across the whole store at the time of the query.
///
/// `total_visits` is zero, never null, on an empty store; `last_created` is
/// absent when there are no records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Stats {
    pub total_urls: i64,
    pub total_visits: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_created: Option<DateTime<Utc>>,
}
