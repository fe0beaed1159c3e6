//! Utility functions for code generation, URL processing, and error classification.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_normalizer`] - URL validation and scheme completion
//! - [`db_error`] - Recognising unique-index violations from the driver

pub mod code_generator;
pub mod db_error;
pub mod url_normalizer;
