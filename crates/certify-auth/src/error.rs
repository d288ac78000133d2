use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token supplied")]
    MissingToken,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("role '{0}' required")]
    Forbidden(String),

    #[error("signing key is not configured")]
    NotConfigured,

    #[error("token encoding failed: {0}")]
    Encoding(String),

    #[error("random source failed: {0}")]
    Random(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken(error.to_string()),
        }
    }
}
