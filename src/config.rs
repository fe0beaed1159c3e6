//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//! A `.env` file is honoured when `main.rs` calls `dotenvy::dotenv()` first.
//!
//! ## Variables
//!
//! - `DATABASE_URL` - SQLite location (default: `sqlite://data/urls.db`, `sqlite::memory:` allowed)
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `BASE_URL` - Prefix for fully-qualified short URLs (default: `http://localhost:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `RATE_LIMIT` / `RATE_LIMIT_WINDOW_SECS` - Requests per client per window (default: 100 per 60s)
//! - `BEHIND_PROXY` - Key rate limits on forwarded client IP headers (default: `false`)
//! - `CLEANUP_INTERVAL_SECS` - Retention sweep interval (default: 86400)
//! - `MAX_URL_AGE_SECS` - Retention age (default: 2592000, 30 days)
//! - `SWEEP_TIMEOUT_SECS` - Bound on a single sweep (default: 60)
//! - `STORE_TIMEOUT_SECS` - Bound on interactive store calls (default: 5)
//! - `VISIT_QUEUE_CAPACITY` - Visit event buffer size (default: 10000, min: 100)
//! - `VISIT_WORKER_CONCURRENCY` - Concurrent visit increments (default: 4)
//! - `DB_MAX_CONNECTIONS`, `DB_CONNECT_TIMEOUT`, `DB_IDLE_TIMEOUT`, `DB_MAX_LIFETIME` - Pool settings

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::application::workers::SweeperConfig;
use crate::infrastructure::persistence::SqliteStoreOptions;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub base_url: String,
    pub log_level: String,
    pub log_format: String,
    /// Requests allowed per client within `rate_limit_window_secs`.
    pub rate_limit: u32,
    pub rate_limit_window_secs: u64,
    /// When true, rate limiting reads client IP from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub cleanup_interval_secs: u64,
    pub max_url_age_secs: u64,
    pub sweep_timeout_secs: u64,
    pub store_timeout_secs: u64,
    pub visit_queue_capacity: usize,
    /// Maximum number of visit increments applied concurrently by the background worker.
    pub visit_worker_concurrency: usize,

    // ── SqlitePool settings ─────────────────────────────────────────────────
    /// Maximum number of connections in the pool (`DB_MAX_CONNECTIONS`, default: 25).
    pub db_max_connections: u32,
    /// Timeout for acquiring a connection from the pool in seconds
    /// (`DB_CONNECT_TIMEOUT`, default: 30).
    pub db_connect_timeout: u64,
    /// Idle connection lifetime in seconds before it is closed
    /// (`DB_IDLE_TIMEOUT`, default: 600).
    pub db_idle_timeout: u64,
    /// Maximum connection lifetime in seconds (`DB_MAX_LIFETIME`, default: 300).
    pub db_max_lifetime: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/urls.db".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            base_url: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            rate_limit: 100,
            rate_limit_window_secs: 60,
            behind_proxy: false,
            cleanup_interval_secs: 24 * 60 * 60,
            max_url_age_secs: 30 * 24 * 60 * 60,
            sweep_timeout_secs: 60,
            store_timeout_secs: 5,
            visit_queue_capacity: 10_000,
            visit_worker_concurrency: 4,
            db_max_connections: 25,
            db_connect_timeout: 30,
            db_idle_timeout: 600,
            db_max_lifetime: 300,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            listen_addr: env::var("LISTEN").unwrap_or(defaults.listen_addr),
            base_url: env::var("BASE_URL").unwrap_or(defaults.base_url),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            rate_limit: parse_var("RATE_LIMIT", defaults.rate_limit)?,
            rate_limit_window_secs: parse_var(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window_secs,
            )?,
            behind_proxy: env::var("BEHIND_PROXY")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.behind_proxy),
            cleanup_interval_secs: parse_var(
                "CLEANUP_INTERVAL_SECS",
                defaults.cleanup_interval_secs,
            )?,
            max_url_age_secs: parse_var("MAX_URL_AGE_SECS", defaults.max_url_age_secs)?,
            sweep_timeout_secs: parse_var("SWEEP_TIMEOUT_SECS", defaults.sweep_timeout_secs)?,
            store_timeout_secs: parse_var("STORE_TIMEOUT_SECS", defaults.store_timeout_secs)?,
            visit_queue_capacity: parse_var(
                "VISIT_QUEUE_CAPACITY",
                defaults.visit_queue_capacity,
            )?,
            visit_worker_concurrency: parse_var(
                "VISIT_WORKER_CONCURRENCY",
                defaults.visit_worker_concurrency,
            )?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_connect_timeout: parse_var("DB_CONNECT_TIMEOUT", defaults.db_connect_timeout)?,
            db_idle_timeout: parse_var("DB_IDLE_TIMEOUT", defaults.db_idle_timeout)?,
            db_max_lifetime: parse_var("DB_MAX_LIFETIME", defaults.db_max_lifetime)?,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any duration, limit, or pool setting is zero
    /// - `visit_queue_capacity` is outside 100..=1000000
    /// - `visit_worker_concurrency` is outside 1..=256
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr`, `database_url`, or `base_url` is malformed
    pub fn validate(&self) -> Result<()> {
        if self.visit_queue_capacity < 100 {
            anyhow::bail!(
                "VISIT_QUEUE_CAPACITY must be at least 100, got {}",
                self.visit_queue_capacity
            );
        }

        if self.visit_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "VISIT_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.visit_queue_capacity
            );
        }

        if self.visit_worker_concurrency == 0 || self.visit_worker_concurrency > 256 {
            anyhow::bail!(
                "VISIT_WORKER_CONCURRENCY must be between 1 and 256, got {}",
                self.visit_worker_concurrency
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!(
                "DATABASE_URL must start with 'sqlite:', got '{}'",
                self.database_url
            );
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        let positive = [
            ("RATE_LIMIT", u64::from(self.rate_limit)),
            ("RATE_LIMIT_WINDOW_SECS", self.rate_limit_window_secs),
            ("CLEANUP_INTERVAL_SECS", self.cleanup_interval_secs),
            ("MAX_URL_AGE_SECS", self.max_url_age_secs),
            ("SWEEP_TIMEOUT_SECS", self.sweep_timeout_secs),
            ("STORE_TIMEOUT_SECS", self.store_timeout_secs),
            ("DB_MAX_CONNECTIONS", u64::from(self.db_max_connections)),
            ("DB_CONNECT_TIMEOUT", self.db_connect_timeout),
            ("DB_IDLE_TIMEOUT", self.db_idle_timeout),
            ("DB_MAX_LIFETIME", self.db_max_lifetime),
        ];

        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            anyhow::bail!("{name} must be greater than 0");
        }

        Ok(())
    }

    /// Pool settings for [`crate::infrastructure::persistence::SqliteLinkStore::connect`].
    pub fn store_options(&self) -> SqliteStoreOptions {
        SqliteStoreOptions {
            database_url: self.database_url.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_connect_timeout),
            idle_timeout: Duration::from_secs(self.db_idle_timeout),
            max_lifetime: Duration::from_secs(self.db_max_lifetime),
            ..SqliteStoreOptions::default()
        }
    }

    pub fn sweeper_config(&self) -> SweeperConfig {
        SweeperConfig {
            interval: Duration::from_secs(self.cleanup_interval_secs),
            max_age: Duration::from_secs(self.max_url_age_secs),
            run_timeout: Duration::from_secs(self.sweep_timeout_secs),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Database: {}", mask_connection_string(&self.database_url));
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!(
            "  Rate limit: {} per {}s (behind proxy: {})",
            self.rate_limit,
            self.rate_limit_window_secs,
            self.behind_proxy
        );
        tracing::info!(
            "  Retention: sweep every {}s, max age {}s",
            self.cleanup_interval_secs,
            self.max_url_age_secs
        );
        tracing::info!("  Visit queue capacity: {}", self.visit_queue_capacity);
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Masks credentials in connection strings for logging.
///
/// SQLite URLs normally carry none, but query parameters such as
/// `?password=...` are redacted if present.
fn mask_connection_string(url: &str) -> String {
    match url.split_once('?') {
        Some((path, query)) => {
            let masked: Vec<String> = query
                .split('&')
                .map(|pair| match pair.split_once('=') {
                    Some((key, _)) if key.eq_ignore_ascii_case("password") => {
                        format!("{key}=***")
                    }
                    _ => pair.to_string(),
                })
                .collect();
            format!("{path}?{}", masked.join("&"))
        }
        None => url.to_string(),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
