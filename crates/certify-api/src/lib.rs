//! # certify-api
//!
//! axum REST surface over [`certify_db::service::CertifyService`].
//!
//! `POST /token` exchanges an email and password for a bearer token.
//! Everything under `/api` is read-only and, apart from services,
//! requires an admin or auditor token.

pub mod error;
pub mod extract;
mod routes;
pub mod state;

use tokio::net::TcpListener;

use certify_auth::TokenIssuer;
use certify_config::CertifyConfig;
use certify_db::service::CertifyService;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

/// Open the database, bind `server.bind`, and serve until Ctrl-C.
///
/// # Errors
///
/// Returns `ApiError` if auth is not configured, the database cannot be
/// opened, or the listener cannot bind.
pub async fn serve(config: &CertifyConfig) -> Result<(), ApiError> {
    config.auth.require_configured()?;
    let addr = config.server.socket_addr()?;
    let tokens = TokenIssuer::from_config(&config.auth)?;
    let service = CertifyService::from_config(config).await?;
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, AppState::new(service, tokens)).await
}

/// Serve on an already bound listener.
///
/// # Errors
///
/// Returns `ApiError::Io` if the server stops with an I/O error.
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), ApiError> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "certify api listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
