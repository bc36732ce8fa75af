// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::{ranking::RankingError, store::StoreError};

/// Every failure a handler or middleware can surface to a client.
/// The response body is always `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input: blank scope ids, marks out of range, bad `topN`.
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed or expired bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Valid token whose role may not modify results.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Record id already taken.
    #[error("{0}")]
    Conflict(String),

    /// Store or ranking failure. The detail is logged, never sent.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(id) => AppError::Conflict(format!("Record '{}' already exists", id)),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// A blank scope id is the caller's fault; every other ranking failure is ours.
impl From<RankingError> for AppError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::MissingField(_) => AppError::BadRequest(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Cross-field checks that run outside a derived `validate()`, such as
/// merged marks on update.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
