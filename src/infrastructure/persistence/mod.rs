//! SQLite store implementation.
//!
//! Concrete implementation of the domain [`crate::domain::repositories::LinkStore`]
//! trait using SQLx runtime-checked queries. The schema is embedded from
//! `./migrations` and applied on connect.

pub mod sqlite_link_store;

pub use sqlite_link_store::{SqliteLinkStore, SqliteStoreOptions};
