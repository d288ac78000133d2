//! Bearer-token extractors.
//!
//! [`Authenticated`] accepts any valid token. [`Staff`] additionally
//! requires the admin or auditor role.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use certify_auth::{AuthError, CertifyClaims};
use certify_core::enums::ApiRole;

use crate::error::ApiError;
use crate::state::AppState;

const STAFF_ROLES: [ApiRole; 2] = [ApiRole::Admin, ApiRole::Auditor];

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token.trim())
}

/// Claims of any caller holding a valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub CertifyClaims);

#[axum::async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token).map_err(|error| {
            tracing::debug!(%error, "bearer token rejected");
            error
        })?;
        Ok(Self(claims))
    }
}

/// Claims of an admin or auditor.
#[derive(Debug, Clone)]
pub struct Staff(pub CertifyClaims);

#[axum::async_trait]
impl FromRequestParts<AppState> for Staff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Authenticated(claims) = Authenticated::from_request_parts(parts, state).await?;
        if !claims.has_any_role(&STAFF_ROLES) {
            return Err(AuthError::Forbidden("admin, auditor".into()).into());
        }
        Ok(Self(claims))
    }
}
