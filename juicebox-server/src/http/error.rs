//! API error types with IntoResponse
//!
//! Errors become `{ "name": ..., "message": ... }` JSON bodies with an
//! appropriate status code. Extractor rejections (bad path ids, unparseable
//! bodies) are folded into [`ApiError::Validation`] so clients never see
//! axum's plain-text rejections.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::DbError;

/// API error type with automatic HTTP status mapping
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body or parameters are unusable (400)
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Missing or unusable requester identity (401)
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Requester may not touch this resource (403)
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Resource not found (404)
    #[error("{name}: {message}")]
    NotFound { name: &'static str, message: String },

    /// Database error (500, logged)
    #[error(transparent)]
    Database(DbError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn user_not_found() -> Self {
        Self::NotFound {
            name: "UserNotFoundError",
            message: "Could not find a user with that userId".into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation { message } => json!({
                "name": "ValidationError",
                "message": message
            }),
            Self::Unauthorized { message } => json!({
                "name": "UnauthorizedError",
                "message": message
            }),
            Self::Forbidden { message } => json!({
                "name": "ForbiddenError",
                "message": message
            }),
            Self::NotFound { name, message } => json!({
                "name": name,
                "message": message
            }),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                json!({
                    "name": e.name(),
                    "message": "an internal error occurred"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::PostNotFound { .. } => Self::NotFound {
                name: e.name(),
                message: e.to_string(),
            },
            _ => Self::Database(e),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}
