//! SQLite implementation of the link store.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{NewShortLink, ShortLink, Stats};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;

const SELECT_COLUMNS: &str = "SELECT id, original_url, code, visits, created_at FROM short_links";

/// Connection pool settings for [`SqliteLinkStore::connect`].
#[derive(Debug, Clone)]
pub struct SqliteStoreOptions {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub busy_timeout: Duration,
}

impl Default for SqliteStoreOptions {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/urls.db".to_string(),
            max_connections: 25,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(300),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl SqliteStoreOptions {
    /// Returns true if the URL names a private in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// SQLite store for short links.
///
/// Code uniqueness is enforced by the `UNIQUE` index on `short_links.code`;
/// visit increments are single `UPDATE ... SET visits = visits + 1` statements.
pub struct SqliteLinkStore {
    pool: Arc<SqlitePool>,
}

impl SqliteLinkStore {
    /// Creates a store over an existing, already migrated pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Opens the database, creating it if needed, and applies migrations.
    ///
    /// An in-memory database is pinned to a single connection that is never
    /// reaped, since each SQLite connection would otherwise see its own empty
    /// database.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] if the URL is invalid, the database cannot
    /// be opened, or migrations fail.
    pub async fn connect(options: &SqliteStoreOptions) -> Result<Self, AppError> {
        let in_memory = options.is_in_memory();

        let mut connect_options = SqliteConnectOptions::from_str(&options.database_url)?
            .create_if_missing(true)
            .busy_timeout(options.busy_timeout);

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .acquire_timeout(options.acquire_timeout)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
            ensure_parent_dir(&connect_options)?;

            SqlitePoolOptions::new()
                .max_connections(options.max_connections)
                .acquire_timeout(options.acquire_timeout)
                .idle_timeout(Some(options.idle_timeout))
                .max_lifetime(Some(options.max_lifetime))
        };

        let pool = pool_options.connect_with(connect_options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(in_memory, "Link store ready");

        Ok(Self::new(Arc::new(pool)))
    }

    /// Runs a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    /// Returns the SQLite library version, for diagnostics.
    pub async fn sqlite_version(&self) -> Result<String, AppError> {
        let version = sqlx::query_scalar::<_, String>("SELECT sqlite_version()")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(version)
    }
}

fn ensure_parent_dir(options: &SqliteConnectOptions) -> Result<(), AppError> {
    if let Some(parent) = options.get_filename().parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::database(
                "Failed to create database directory",
                json!({ "path": parent.display().to_string(), "reason": e.to_string() }),
            )
        })?;
    }
    Ok(())
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let result = sqlx::query(
            "INSERT INTO short_links (code, original_url, visits, created_at) VALUES (?, ?, 0, ?)",
        )
        .bind(&new_link.code)
        .bind(&new_link.original_url)
        .bind(new_link.created_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { message, .. } => {
                AppError::conflict(message, json!({ "code": new_link.code }))
            }
            other => other,
        })?;

        Ok(new_link.into_short_link(result.last_insert_rowid()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!("{SELECT_COLUMNS} WHERE code = ?"))
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(link)
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            "{SELECT_COLUMNS} WHERE original_url = ? ORDER BY created_at ASC, id ASC LIMIT 1"
        ))
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn increment_visits(&self, code: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE short_links SET visits = visits + 1 WHERE code = ?")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        let links = sqlx::query_as::<_, ShortLink>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn stats(&self) -> Result<Stats, AppError> {
        let stats = sqlx::query_as::<_, Stats>(
            r#"
            SELECT
                COUNT(*) AS total_urls,
                COALESCE(SUM(visits), 0) AS total_visits,
                MAX(created_at) AS last_created
            FROM short_links
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(stats)
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM short_links WHERE code = ?)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn delete_older_than(&self, age: Duration) -> Result<u64, AppError> {
        if age.is_zero() {
            return Err(AppError::bad_request("Age must be positive", json!({})));
        }

        let age = chrono::Duration::from_std(age).map_err(|_| {
            AppError::bad_request("Age is out of range", json!({ "age_secs": age.as_secs() }))
        })?;
        let cutoff = Utc::now() - age;

        let result = sqlx::query("DELETE FROM short_links WHERE created_at < ?")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
