use std::sync::Arc;

use certify_auth::TokenIssuer;
use certify_db::service::CertifyService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CertifyService>,
    pub tokens: TokenIssuer,
}

impl AppState {
    #[must_use]
    pub fn new(service: CertifyService, tokens: TokenIssuer) -> Self {
        Self {
            service: Arc::new(service),
            tokens,
        }
    }
}
