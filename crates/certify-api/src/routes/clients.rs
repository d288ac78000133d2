//! Client, client address and client contact reads.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use certify_core::entities::{Client, ClientAddress, ClientContactListItem, ClientListItem};

use crate::error::ApiError;
use crate::extract::Staff;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientListQuery {
    #[serde(default)]
    pub max_count: i64,
}

pub async fn list_clients(
    _: Staff,
    State(state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<Vec<ClientListItem>>, ApiError> {
    Ok(Json(state.service.list_clients(query.max_count).await?))
}

pub async fn get_client(
    _: Staff,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Client>, ApiError> {
    let client = state.service.fetch_client(id).await?;
    if client.company.is_empty() {
        return Err(ApiError::NotFound(format!("client {id}")));
    }
    Ok(Json(client))
}

pub async fn all_addresses(
    _: Staff,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientAddress>>, ApiError> {
    Ok(Json(state.service.all_addresses().await?))
}

pub async fn client_addresses(
    _: Staff,
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<ClientAddress>>, ApiError> {
    Ok(Json(state.service.addresses_for_client(client_id, false).await?))
}

pub async fn all_contacts(
    _: Staff,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientContactListItem>>, ApiError> {
    Ok(Json(state.service.contact_list(None).await?))
}

pub async fn client_contacts(
    _: Staff,
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<ClientContactListItem>>, ApiError> {
    Ok(Json(state.service.contact_list(Some(client_id)).await?))
}

/// Writes on staff resources are accepted for routing but not implemented.
pub async fn not_implemented(_: Staff) -> ApiError {
    ApiError::NotImplemented
}
