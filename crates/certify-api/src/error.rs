//! HTTP error mapping.
//!
//! Storage and auth failures are converted here so handlers can use `?`.
//! Internal details are traced but never sent to the caller.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use certify_auth::AuthError;
use certify_config::ConfigError;
use certify_core::errors::CoreError;
use certify_db::error::DatabaseError;

pub const INVALID_GRANT_DESCRIPTION: &str = "The user name or password is incorrect.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[source] AuthError),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("not implemented")]
    NotImplemented,

    #[error("invalid grant")]
    InvalidGrant,

    #[error("unsupported grant type '{0}'")]
    UnsupportedGrantType(String),

    #[error(transparent)]
    Database(DatabaseError),

    #[error(transparent)]
    Auth(AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        if error.is_not_found() {
            return Self::NotFound(error.to_string());
        }
        match error {
            DatabaseError::Core(CoreError::Validation(message)) => Self::BadRequest(message),
            other => Self::Database(other),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        DatabaseError::from(error).into()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Forbidden(role) => Self::Forbidden(role),
            AuthError::MissingToken | AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                Self::Unauthorized(error)
            }
            other => Self::Auth(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(error) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "message": error.to_string() })),
            )
                .into_response(),
            Self::Forbidden(role) => (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": format!("role '{role}' required") })),
            )
                .into_response(),
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED.into_response(),
            Self::InvalidGrant => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_grant",
                    "error_description": INVALID_GRANT_DESCRIPTION,
                })),
            )
                .into_response(),
            Self::UnsupportedGrantType(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "unsupported_grant_type" })),
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "An error has occurred." })),
                )
                    .into_response()
            }
        }
    }
}
