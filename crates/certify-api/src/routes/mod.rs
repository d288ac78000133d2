//! Route table.
//!
//! Paths are lower case. Writes on clients, addresses, contacts and
//! services answer 501.

mod audits;
mod clients;
mod services;
mod status;
mod token;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/token", post(token::issue_token))
        .route("/api/status", get(status::health))
        .route("/api/sxcstatus", get(status::active_statuses))
        .route("/api/sxcstatus/:status_type", get(status::status))
        .route(
            "/api/client",
            get(clients::list_clients).post(clients::not_implemented),
        )
        .route(
            "/api/client/:id",
            get(clients::get_client)
                .put(clients::not_implemented)
                .delete(clients::not_implemented),
        )
        .route(
            "/api/clientaddress",
            get(clients::all_addresses).post(clients::not_implemented),
        )
        .route(
            "/api/clientaddress/:client_id",
            get(clients::client_addresses)
                .put(clients::not_implemented)
                .delete(clients::not_implemented),
        )
        .route(
            "/api/clientcontact",
            get(clients::all_contacts).post(clients::not_implemented),
        )
        .route(
            "/api/clientcontact/:client_id",
            get(clients::client_contacts)
                .put(clients::not_implemented)
                .delete(clients::not_implemented),
        )
        .route(
            "/api/service",
            get(services::active_service_names).post(services::not_implemented),
        )
        .route(
            "/api/service/:id",
            get(services::get_service)
                .put(services::not_implemented)
                .delete(services::not_implemented),
        )
        .route("/api/audit", get(audits::list_audits))
        .route("/api/audit/:id", get(audits::get_audit))
        .route("/api/application", get(audits::list_applications))
        .route("/api/application/:id", get(audits::get_application))
        .route(
            "/api/applicationresponse/:id",
            get(audits::application_responses),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
