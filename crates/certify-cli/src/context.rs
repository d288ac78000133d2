use anyhow::Context;

use certify_config::CertifyConfig;
use certify_db::service::CertifyService;

/// Loaded configuration plus an open database.
pub struct AppContext {
    pub config: CertifyConfig,
    pub service: CertifyService,
}

impl AppContext {
    pub async fn init(config: CertifyConfig) -> anyhow::Result<Self> {
        let service = CertifyService::from_config(&config)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;
        Ok(Self { config, service })
    }
}
