//! Domain layer containing business entities and storage contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Short link and aggregate stats records
//! - [`repositories`] - The [`repositories::LinkStore`] trait implemented by infrastructure
//! - [`visit_event`] - Visit event passed from the redirect handler to the visit worker
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Behaviour lives in [`crate::application`].

pub mod entities;
pub mod repositories;
pub mod visit_event;
