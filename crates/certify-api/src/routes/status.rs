use axum::Json;
use axum::extract::{Path, State};

use certify_core::enums::StatusType;
use certify_core::status::Status;

use crate::error::ApiError;
use crate::extract::{Authenticated, Staff};
use crate::state::AppState;

pub async fn health(_: Authenticated) -> Json<&'static str> {
    Json("Status: OK")
}

/// Dashboard statuses with a non-zero count.
pub async fn active_statuses(
    _: Staff,
    State(state): State<AppState>,
) -> Result<Json<Vec<Status>>, ApiError> {
    Ok(Json(state.service.active_statuses().await?))
}

/// One status by SCREAMING name or position.
pub async fn status(
    _: Staff,
    State(state): State<AppState>,
    Path(status_type): Path<String>,
) -> Result<Json<Status>, ApiError> {
    let status_type: StatusType = status_type.parse()?;
    Ok(Json(state.service.status(status_type).await?))
}
