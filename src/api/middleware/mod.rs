//! HTTP middleware for request processing and protection.
//!
//! Provides rate limiting, response hardening and observability middleware.

pub mod hardening;
pub mod rate_limit;
pub mod tracing;
