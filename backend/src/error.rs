use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::db::StoreError;
use crate::handlers::response::Envelope;

/// A client-facing failure: a headline message plus the offending field and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: String,
    pub field: &'static str,
    pub reason: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}: {})", self.message, self.field, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(Rejection),

    #[error("Invalid argument: {0}")]
    InvalidArgument(Rejection),

    #[error("Forbidden: {0}")]
    Forbidden(Rejection),

    #[error("Conflict: {0}")]
    Conflict(Rejection),

    #[error("Unauthorized: {0}")]
    Unauthorized(Rejection),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AppError::NotFound(r)
            | AppError::InvalidArgument(r)
            | AppError::Forbidden(r)
            | AppError::Conflict(r)
            | AppError::Unauthorized(r) => Some(r),
            AppError::Internal(_) => None,
        }
    }

    pub fn unauthorized() -> Self {
        AppError::Unauthorized(Rejection::new(
            "Unauthorized",
            "token",
            "Please log in",
        ))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => AppError::Conflict(Rejection::new(
                "Resource already exists",
                "general",
                format!("{constraint} already holds this value"),
            )),
            StoreError::Database(err) => AppError::Internal(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let envelope = match self.rejection() {
            Some(rejection) => {
                tracing::debug!(status = %status, error = %rejection, "Rejecting request");
                Envelope::<()>::error(
                    rejection.message.clone(),
                    json!({ rejection.field: rejection.reason }),
                )
            }
            None => {
                // Internals stay in the logs
                tracing::error!(error = ?self, "Request failed with an internal error");
                Envelope::<()>::error(
                    "Internal Server Error",
                    json!({ "general": "Internal Server Error" }),
                )
            }
        };

        (status, Json(envelope)).into_response()
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
