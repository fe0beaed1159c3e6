//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! - [`ShortLink`] - A stored code → URL mapping
//! - [`NewShortLink`] - Input for inserting a mapping
//! - [`Stats`] - Aggregate totals over all mappings

pub mod short_link;
pub mod stats;

pub use short_link::{NewShortLink, ShortLink};
pub use stats::Stats;
