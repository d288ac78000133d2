//! `POST /token`: OAuth2 resource-owner password grant.

use axum::extract::State;
use axum::{Form, Json};
use serde::Deserialize;

use certify_auth::IssuedToken;
use certify_auth::password::verify_password;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn issue_token(
    State(state): State<AppState>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    if request.grant_type != "password" {
        return Err(ApiError::UnsupportedGrantType(request.grant_type));
    }

    let user = state
        .service
        .user_by_email(request.username.trim())
        .await?
        .filter(|user| user.active)
        .filter(|user| verify_password(&user.password, &user.password_salt, &request.password));

    let Some(user) = user else {
        state
            .service
            .write_log(&format!("Access Denied for: {}", request.username))
            .await;
        tracing::info!(username = %request.username, "password grant denied");
        return Err(ApiError::InvalidGrant);
    };

    let roles = state.service.api_roles(user.user_id).await?;
    let token = state.tokens.issue(user.user_id, roles)?;
    state
        .service
        .write_log(&format!("Access Granted for: {}", user.full_name))
        .await;
    tracing::info!(user_id = user.user_id, "password grant issued");
    Ok(Json(token))
}
