//! Error types for the expense tracker
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::form::ExpenseForm;
use crate::models::Notification;

/// Where unauthenticated callers are sent.
pub const AUTH_REDIRECT: &str = "/auth";

// == Tracker Error Enum ==
/// Unified error type for the expense tracker.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A form rule was violated; nothing was sent to the data service
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No session could be resolved from the request
    #[error("Not signed in")]
    Unauthorized,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The data service answered with an error status
    #[error("Data service error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// The data service could not be reached or answered garbage
    #[error("Data service unreachable: {0}")]
    Network(String),

    /// A write failed; carries the toast and, for form writes, the values as submitted
    #[error("{}", notification.message)]
    MutationFailed {
        notification: Notification,
        form: Option<ExpenseForm>,
    },

    /// Offline shell cache is at capacity
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Failed write with a user-visible error notification.
    pub fn mutation_failed(message: impl Into<String>, form: Option<ExpenseForm>) -> Self {
        TrackerError::MutationFailed {
            notification: Notification::error(message),
            form,
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::Unauthorized => StatusCode::UNAUTHORIZED,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Remote { .. } | TrackerError::MutationFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            TrackerError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            TrackerError::CacheFull(_) => StatusCode::INSUFFICIENT_STORAGE,
            TrackerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            TrackerError::Validation(msg) => json!({
                "error": msg,
                "notification": Notification::error(msg.clone()),
            }),
            TrackerError::Unauthorized => json!({
                "error": "Not signed in",
                "redirect": AUTH_REDIRECT,
            }),
            TrackerError::MutationFailed { notification, form } => json!({
                "error": notification.message,
                "notification": notification,
                "form": form,
            }),
            TrackerError::Remote { message, .. } => json!({ "error": message }),
            TrackerError::NotFound(msg)
            | TrackerError::Network(msg)
            | TrackerError::CacheFull(msg)
            | TrackerError::Internal(msg) => json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the expense tracker.
pub type Result<T> = std::result::Result<T, TrackerError>;
