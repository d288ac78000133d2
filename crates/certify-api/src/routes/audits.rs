//! Audit and web application reads.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use certify_core::entities::{Audit, WebApplication, WebApplicationResponse};
use certify_core::enums::ListCriteria;
use certify_core::ids::UNSET_ID;

use crate::error::ApiError;
use crate::extract::Staff;
use crate::state::AppState;

/// `?criteria=`; absent means `open`.
#[derive(Debug, Default, Deserialize)]
pub struct CriteriaQuery {
    pub criteria: Option<String>,
}

impl CriteriaQuery {
    fn list_criteria(&self) -> ListCriteria {
        self.criteria.as_deref().map_or(ListCriteria::Open, ListCriteria::from)
    }
}

pub async fn list_audits(
    _: Staff,
    State(state): State<AppState>,
    Query(query): Query<CriteriaQuery>,
) -> Result<Json<Vec<Audit>>, ApiError> {
    Ok(Json(state.service.list_audits(&query.list_criteria()).await?))
}

pub async fn get_audit(
    _: Staff,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Audit>, ApiError> {
    let audit = state.service.fetch_audit(id).await?;
    if audit.client_id == UNSET_ID {
        return Err(ApiError::NotFound(format!("audit {id}")));
    }
    Ok(Json(audit))
}

pub async fn list_applications(
    _: Staff,
    State(state): State<AppState>,
    Query(query): Query<CriteriaQuery>,
) -> Result<Json<Vec<WebApplication>>, ApiError> {
    Ok(Json(
        state.service.list_applications(&query.list_criteria()).await?,
    ))
}

/// Only submitted applications are visible.
pub async fn get_application(
    _: Staff,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WebApplication>, ApiError> {
    state
        .service
        .submitted_application(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("web_application {id}")))
}

pub async fn application_responses(
    _: Staff,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<WebApplicationResponse>>, ApiError> {
    state
        .service
        .application_responses(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("responses for web_application {id}")))
}
