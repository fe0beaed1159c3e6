//! Short link creation and resolution service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{NewShortLink, ShortLink, Stats};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

/// Default bound on a single interactive store call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Page size used when the caller passes no limit or a non-positive one.
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Service for creating and resolving short links.
///
/// Handles URL normalization, custom code validation, random code generation,
/// and dedup by original URL. Code uniqueness itself is left to the store:
/// the existence check before insert only produces a friendlier error.
///
/// Every store call is bounded by the operation timeout; a timeout surfaces as
/// [`AppError::Database`] and nothing is assumed committed.
pub struct LinkService<S: LinkStore> {
    store: Arc<S>,
    operation_timeout: Duration,
}

impl<S: LinkStore> LinkService<S> {
    /// Creates a new link service with the default operation timeout.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Overrides the per-call store timeout.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Bound applied to each store call.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Creates a short link, or returns the existing one for the same URL.
    ///
    /// # Arguments
    ///
    /// - `url` - The URL to shorten; `http://` is prepended if no scheme is given
    /// - `custom_code` - Optional user-chosen code; an empty string counts as absent
    ///
    /// # Deduplication
    ///
    /// If a link for the same normalized URL exists, it is returned unchanged.
    /// The lookup is best-effort: two concurrent first submissions of one URL
    /// may both insert, leaving two records that share `original_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - URL is invalid
    /// - Custom code is invalid or already in use
    /// - The insert lost a race for the same code (`details.retryable = true`)
    ///
    /// Returns [`AppError::Internal`] if the random source fails, and
    /// [`AppError::Database`] on storage failures or timeouts.
    pub async fn create_short_url(
        &self,
        url: &str,
        custom_code: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        let normalized_url = normalize_url(url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let code = match custom_code.filter(|c| !c.is_empty()) {
            Some(custom) => {
                validate_custom_code(custom)?;

                if self
                    .bounded("code_exists", self.store.code_exists(custom))
                    .await?
                {
                    return Err(AppError::bad_request(
                        "Custom code already in use",
                        json!({ "code": custom }),
                    ));
                }

                custom.to_string()
            }
            None => generate_code()?,
        };

        if let Some(existing) = self
            .bounded(
                "find_by_original_url",
                self.store.find_by_original_url(&normalized_url),
            )
            .await?
        {
            tracing::debug!(code = %existing.code, "Returning existing short link");
            return Ok(existing);
        }

        let new_link = NewShortLink::new(code, normalized_url);

        match self.bounded("insert", self.store.insert(new_link)).await {
            Ok(link) => {
                tracing::info!(code = %link.code, "Short link created");
                Ok(link)
            }
            Err(AppError::Conflict { details, .. }) => Err(AppError::bad_request(
                "Short code already in use, please retry",
                json!({ "code": details.get("code"), "retryable": true }),
            )),
            Err(e) => Err(e),
        }
    }

    /// Resolves a short code to its link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty code.
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Database`] on storage failures.
    pub async fn get_url(&self, code: &str) -> Result<ShortLink, AppError> {
        if code.is_empty() {
            return Err(AppError::bad_request("Code cannot be empty", json!({})));
        }

        self.bounded("find_by_code", self.store.find_by_code(code))
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Adds one visit to the link with this code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty code.
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Database`] on storage failures.
    pub async fn increment_visits(&self, code: &str) -> Result<(), AppError> {
        if code.is_empty() {
            return Err(AppError::bad_request("Code cannot be empty", json!({})));
        }

        self.bounded("increment_visits", self.store.increment_visits(code))
            .await
    }

    /// Lists the most recently created links, newest first.
    ///
    /// A missing or non-positive `limit` becomes [`DEFAULT_RECENT_LIMIT`].
    pub async fn get_recent_urls(&self, limit: Option<i64>) -> Result<Vec<ShortLink>, AppError> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_RECENT_LIMIT);

        self.bounded("list_recent", self.store.list_recent(limit)).await
    }

    /// Returns aggregate totals over all links.
    pub async fn get_stats(&self) -> Result<Stats, AppError> {
        self.bounded("stats", self.store.stats()).await
    }

    /// Constructs the full short URL from the public base URL and a code.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| {
                AppError::database(
                    "Database operation timed out",
                    json!({
                        "operation": operation,
                        "timeout_ms": self.operation_timeout.as_millis() as u64,
                    }),
                )
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkStore;
    use chrono::Utc;

    fn create_test_link(id: i64, code: &str, url: &str) -> ShortLink {
        ShortLink::new(id, url.to_string(), code.to_string(), 0, Utc::now())
    }

    #[tokio::test]
    async fn test_create_short_url_success() {
        let mut mock_store = MockLinkStore::new();

        mock_store
            .expect_find_by_original_url()
            .withf(|url| url == "https://example.com")
            .times(1)
            .returning(|_| Ok(None));

        mock_store
            .expect_insert()
            .withf(|new_link| new_link.code.len() == 6)
            .times(1)
            .returning(|new_link| Ok(new_link.into_short_link(10)));

        let service = LinkService::new(Arc::new(mock_store));

        let link = service
            .create_short_url("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.id, 10);
        assert_eq!(link.original_url, "https://example.com");
        assert_eq!(link.visits, 0);
    }

    #[tokio::test]
    async fn test_create_short_url_completes_scheme() {
        let mut mock_store = MockLinkStore::new();

        mock_store
            .expect_find_by_original_url()
            .withf(|url| url == "http://example.com/page")
            .times(1)
            .returning(|_| Ok(None));

        mock_store
            .expect_insert()
            .withf(|new_link| new_link.original_url == "http://example.com/page")
            .times(1)
            .returning(|new_link| Ok(new_link.into_short_link(1)));

        let service = LinkService::new(Arc::new(mock_store));

        let link = service
            .create_short_url("example.com/page", None)
            .await
            .unwrap();

        assert_eq!(link.original_url, "http://example.com/page");
    }

    #[tokio::test]
    async fn test_create_short_url_deduplication() {
        let mut mock_store = MockLinkStore::new();

        let existing = create_test_link(5, "existing", "https://example.com");
        mock_store
            .expect_find_by_original_url()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        mock_store.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock_store));

        let link = service
            .create_short_url("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.id, 5);
        assert_eq!(link.code, "existing");
    }

    #[tokio::test]
    async fn test_create_short_url_invalid_url() {
        let mock_store = MockLinkStore::new();
        let service = LinkService::new(Arc::new(mock_store));

        let result = service.create_short_url("not a url", None).await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_short_url_with_custom_code() {
        let mut mock_store = MockLinkStore::new();

        mock_store
            .expect_code_exists()
            .withf(|code| code == "mycode12")
            .times(1)
            .returning(|_| Ok(false));

        mock_store
            .expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));

        mock_store
            .expect_insert()
            .withf(|new_link| new_link.code == "mycode12")
            .times(1)
            .returning(|new_link| Ok(new_link.into_short_link(3)));

        let service = LinkService::new(Arc::new(mock_store));

        let link = service
            .create_short_url("https://example.com", Some("mycode12"))
            .await
            .unwrap();

        assert_eq!(link.code, "mycode12");
    }

    #[tokio::test]
    async fn test_empty_custom_code_is_ignored() {
        let mut mock_store = MockLinkStore::new();

        mock_store.expect_code_exists().times(0);
        mock_store
            .expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        mock_store
            .expect_insert()
            .times(1)
            .returning(|new_link| Ok(new_link.into_short_link(1)));

        let service = LinkService::new(Arc::new(mock_store));

        let link = service
            .create_short_url("https://example.com", Some(""))
            .await
            .unwrap();

        assert_eq!(link.code.len(), 6);
    }

    #[tokio::test]
    async fn test_create_short_url_invalid_custom_code() {
        let mut mock_store = MockLinkStore::new();
        mock_store.expect_code_exists().times(0);
        mock_store.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock_store));

        for code in ["ab", "thisistoolongcode123", "bad code"] {
            let result = service
                .create_short_url("https://example.com", Some(code))
                .await;
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "{code} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_create_short_url_custom_code_in_use() {
        let mut mock_store = MockLinkStore::new();

        mock_store
            .expect_code_exists()
            .withf(|code| code == "taken123")
            .times(1)
            .returning(|_| Ok(true));

        mock_store.expect_find_by_original_url().times(0);
        mock_store.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock_store));

        let err = service
            .create_short_url("https://example.com", Some("taken123"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("already in use"));
    }

    #[tokio::test]
    async fn test_insert_conflict_is_retryable_validation() {
        let mut mock_store = MockLinkStore::new();

        mock_store
            .expect_code_exists()
            .times(1)
            .returning(|_| Ok(false));
        mock_store
            .expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        mock_store.expect_insert().times(1).returning(|new_link| {
            Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_link.code }),
            ))
        });

        let service = LinkService::new(Arc::new(mock_store));

        let err = service
            .create_short_url("https://example.com", Some("race1234"))
            .await
            .unwrap_err();

        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details["retryable"], true);
                assert_eq!(details["code"], "race1234");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_database_error_propagates_from_create() {
        let mut mock_store = MockLinkStore::new();

        mock_store
            .expect_find_by_original_url()
            .times(1)
            .returning(|_| Err(AppError::database("Database error", json!({}))));
        mock_store.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock_store));

        let err = service
            .create_short_url("https://example.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database { .. }));
    }

    #[tokio::test]
    async fn test_get_url_success() {
        let mut mock_store = MockLinkStore::new();

        let link = create_test_link(1, "abc123", "https://example.com");
        mock_store
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let service = LinkService::new(Arc::new(mock_store));

        let link = service.get_url("abc123").await.unwrap();
        assert_eq!(link.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_get_url_not_found() {
        let mut mock_store = MockLinkStore::new();
        mock_store
            .expect_find_by_code()
            .times(1)
            .returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_store));

        let err = service.get_url("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_url_empty_code() {
        let mut mock_store = MockLinkStore::new();
        mock_store.expect_find_by_code().times(0);

        let service = LinkService::new(Arc::new(mock_store));

        let err = service.get_url("").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_increment_visits_not_found() {
        let mut mock_store = MockLinkStore::new();
        mock_store
            .expect_increment_visits()
            .times(1)
            .returning(|code| {
                Err(AppError::not_found(
                    "Short link not found",
                    json!({ "code": code }),
                ))
            });

        let service = LinkService::new(Arc::new(mock_store));

        let err = service.increment_visits("gone").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_recent_urls_defaults_limit() {
        let mut mock_store = MockLinkStore::new();
        mock_store
            .expect_list_recent()
            .withf(|limit| *limit == DEFAULT_RECENT_LIMIT)
            .times(3)
            .returning(|_| Ok(vec![]));

        let service = LinkService::new(Arc::new(mock_store));

        assert!(service.get_recent_urls(None).await.unwrap().is_empty());
        assert!(service.get_recent_urls(Some(0)).await.unwrap().is_empty());
        assert!(service.get_recent_urls(Some(-5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_recent_urls_passes_positive_limit() {
        let mut mock_store = MockLinkStore::new();
        mock_store
            .expect_list_recent()
            .withf(|limit| *limit == 42)
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = LinkService::new(Arc::new(mock_store));

        service.get_recent_urls(Some(42)).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_stats_passthrough() {
        let mut mock_store = MockLinkStore::new();
        mock_store
            .expect_stats()
            .times(1)
            .returning(|| Ok(Stats::default()));

        let service = LinkService::new(Arc::new(mock_store));

        let stats = service.get_stats().await.unwrap();
        assert_eq!(stats, Stats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out_as_database_error() {
        let service = LinkService::new(Arc::new(MockLinkStore::new()))
            .with_operation_timeout(Duration::from_millis(50));

        let result: Result<Stats, AppError> = service
            .bounded("stats", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(Stats::default())
            })
            .await;

        match result {
            Err(AppError::Database { details, .. }) => {
                assert_eq!(details["operation"], "stats");
                assert_eq!(details["timeout_ms"], 50);
            }
            other => panic!("expected database error, got {other:?}"),
        }
    }

    #[test]
    fn test_short_url() {
        let service = LinkService::new(Arc::new(MockLinkStore::new()));

        assert_eq!(
            service.short_url("https://s.example.com/", "abc123"),
            "https://s.example.com/abc123"
        );
        assert_eq!(
            service.short_url("http://localhost:3000", "abcd"),
            "http://localhost:3000/abcd"
        );
    }
}
