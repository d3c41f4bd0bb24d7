//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from zkh-oracle and zkh-policy to HTTP status codes
//! with JSON error bodies. Internal error details are never exposed to
//! clients.
//!
//! Decision-path errors do not reach this module — the engine collapses
//! them into denied decisions. Only administrative-path errors surface
//! here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use zkh_oracle::{StoreError, UpdateError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// The error detail.
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type for administrative handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<zkh_core::ValidationError> for AppError {
    fn from(err: zkh_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::AgreementNotFound(_)
            | StoreError::VersionNotFound { .. }
            | StoreError::ClauseNotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::Validation(_) => Self::Validation(err.to_string()),
            StoreError::InvalidStatus { .. } => Self::Conflict(err.to_string()),
            StoreError::Canonicalization(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<UpdateError> for AppError {
    fn from(err: UpdateError) -> Self {
        match &err {
            UpdateError::MissingClause(_) | UpdateError::MissingClauseId => {
                Self::Validation(err.to_string())
            }
            UpdateError::Store(store_err) => match store_err {
                StoreError::Validation(_) => Self::Validation(err.to_string()),
                StoreError::InvalidStatus { .. } => Self::Conflict(err.to_string()),
                _ => Self::Internal(err.to_string()),
            },
        }
    }
}
