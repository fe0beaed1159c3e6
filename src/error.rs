//! Application error type shared by the store, services and HTTP layer.
//!
//! Every fallible operation in the crate returns [`AppError`]. The variant is the
//! error *kind*; the HTTP boundary picks a status code from it without looking at
//! the message text.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::db_error::is_unique_violation_on_code;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to API clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad input: malformed URL, invalid custom code, code already in use.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Unknown short code.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The store's unique index rejected an insert.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Storage-layer failure, including timeouts.
    #[error("{message}")]
    Database { message: String, details: Value },

    /// Anything unexpected, e.g. the random source failing.
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn database(message: impl Into<String>, details: Value) -> Self {
        Self::Database {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns true for the kinds that indicate a server-side failure.
    ///
    /// Only these are logged as errors; validation and lookup misses are
    /// ordinary caller-facing outcomes.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::Internal { .. })
    }

    /// Converts the error into the payload sent to API clients.
    ///
    /// Server-side failures are reduced to a generic message so no storage
    /// detail reaches the caller.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            AppError::Validation { message, details } => ErrorInfo {
                code: "validation_error",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::Conflict { message, details } => ErrorInfo {
                code: "conflict",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::Database { .. } => ErrorInfo {
                code: "database_error",
                message: "Internal server error".to_string(),
                details: json!({}),
            },
            AppError::Internal { .. } => ErrorInfo {
                code: "internal_error",
                message: "Internal server error".to_string(),
                details: json!({}),
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Database { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on_code(&e) {
            return AppError::conflict("Short code already exists", json!({}));
        }

        match e {
            sqlx::Error::RowNotFound => AppError::not_found("Short link not found", json!({})),
            other => AppError::database(
                "Database error",
                json!({ "reason": other.to_string() }),
            ),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::database("Migration failed", json!({ "reason": e.to_string() }))
    }
}
