use axum::Json;
use axum::extract::{Path, State};

use certify_core::entities::Service;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn active_service_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.service.active_service_names().await?))
}

pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Service>, ApiError> {
    Ok(Json(state.service.fetch_service(id).await?))
}

pub async fn not_implemented() -> ApiError {
    ApiError::NotImplemented
}
