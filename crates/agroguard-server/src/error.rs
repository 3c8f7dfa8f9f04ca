//! HTTP-facing error taxonomy.
//!
//! Every failure becomes a structured `{"detail": ...}` response with a
//! status from the taxonomy: validation 400, authentication 401,
//! authorization 403, not-found 404, dependency failure 400. Nothing here
//! crashes the process.

use agroguard_core::AuthError;
use agroguard_store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Request-level failures, mapped onto HTTP statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or duplicate input.
    #[error("{0}")]
    Validation(String),
    /// Missing, malformed, expired, or invalid credentials.
    #[error("{0}")]
    Unauthenticated(String),
    /// Valid identity, wrong owner.
    #[error("{0}")]
    Forbidden(String),
    /// Referenced entity absent.
    #[error("{0}")]
    NotFound(String),
    /// A collaborator (classifier, renderer) could not satisfy the request.
    #[error("{0}")]
    Dependency(String),
    /// Unexpected storage or I/O failure; fatal to this request only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Dependency(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            log::error!("request failed internally: {detail}");
        }
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccountExists => ApiError::Validation("Email already registered".to_string()),
            StoreError::Sqlite(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => {
                ApiError::Unauthenticated("Invalid or expired token".to_string())
            }
            AuthError::Hash(detail) | AuthError::TokenEncode(detail) => {
                ApiError::Internal(detail)
            }
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
