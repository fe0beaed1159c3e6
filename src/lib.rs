//! # nano-link
//!
//! A small URL shortening service built with Axum and SQLite.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Short link entities and the [`domain::repositories::LinkStore`] trait
//! - **Application Layer** ([`application`]) - Link service, visit worker, retention sweeper
//! - **Infrastructure Layer** ([`infrastructure`]) - SQLite-backed store
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Random 6-character codes or custom 4-12 character codes
//! - Dedup by normalized URL
//! - Visit counting off the redirect path
//! - Age-based retention sweep
//! - Per-client rate limiting and request tracing
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL="sqlite://data/urls.db"
//! export BASE_URL="http://localhost:3000"
//!
//! # Migrations are applied on startup
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::LinkService;
    pub use crate::application::workers::{RetentionSweeper, SweeperConfig};
    pub use crate::domain::entities::{NewShortLink, ShortLink, Stats};
    pub use crate::domain::repositories::LinkStore;
    pub use crate::error::AppError;
    pub use crate::infrastructure::persistence::{SqliteLinkStore, SqliteStoreOptions};
    pub use crate::state::AppState;
}
