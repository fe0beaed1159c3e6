//! Application layer: services and background workers.
//!
//! Services consume the [`crate::domain::repositories::LinkStore`] trait and
//! provide a clean API for HTTP handlers and the admin CLI. Workers own the
//! background activity of the server process.
//!
//! # Components
//!
//! - [`services::LinkService`] - Short link creation, resolution and totals
//! - [`workers::run_visit_worker`] - Applies queued visit increments
//! - [`workers::RetentionSweeper`] - Periodic age-based deletion

pub mod services;
pub mod workers;
