//! Store trait definitions for the domain layer.
//!
//! The trait abstracts data access so the service can be tested in isolation
//! from real storage. The production implementation lives in
//! `crate::infrastructure::persistence`; a mock is auto-generated via `mockall`
//! for unit tests.

pub mod link_store;

pub use link_store::LinkStore;

#[cfg(test)]
pub use link_store::MockLinkStore;
