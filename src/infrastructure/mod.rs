//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! - [`persistence`] - SQLite store implementation

pub mod persistence;
