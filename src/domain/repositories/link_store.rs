//! Store trait for short link persistence.

use crate::domain::entities::{NewShortLink, ShortLink, Stats};
use crate::error::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// Durable keyed storage for short links.
///
/// The store is the single authority for code uniqueness and for atomic visit
/// increments. Each method is independently atomic against the backing medium;
/// callers never read-modify-write a record.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteLinkStore`] - SQLite implementation
/// - `MockLinkStore` - generated by `mockall` under `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/store_sqlite.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Inserts a new short link with zero visits.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists. This is
    /// decided by the store's unique index, not by a prior lookup.
    ///
    /// Returns [`AppError::Database`] on storage failures.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortLink))` if found
    /// - `Ok(None)` if not found
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Finds a link by its normalized original URL.
    ///
    /// If concurrent first inserts produced several records for the same URL,
    /// the earliest one is returned.
    async fn find_by_original_url(&self, original_url: &str)
    -> Result<Option<ShortLink>, AppError>;

    /// Atomically adds one to the visit counter of `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row matched.
    /// Returns [`AppError::Database`] on storage failures.
    async fn increment_visits(&self, code: &str) -> Result<(), AppError>;

    /// Lists up to `limit` links, most recently created first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<ShortLink>, AppError>;

    /// Computes aggregate totals over all stored links.
    async fn stats(&self) -> Result<Stats, AppError>;

    /// Returns true if a link with this code exists.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes every link created more than `age` ago.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `age` is zero.
    async fn delete_older_than(&self, age: Duration) -> Result<u64, AppError>;

    /// Releases the store's resources. Subsequent calls are no-ops.
    async fn close(&self);
}
