//! Service layer for repository methods.
//!
//! `CertifyService` wraps `CertifyDb` together with the settings repos
//! need (path rewriting, dashboard thresholds). All repo methods are
//! implemented as `impl CertifyService` blocks under `repos/`.

use certify_config::CertifyConfig;
use certify_core::paths::PathRewrite;

use crate::CertifyDb;
use crate::error::DatabaseError;

/// Settings consulted by repository methods.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub app_type: String,
    pub paths: PathRewrite,
    pub stale_application_days: i64,
    pub audit_warning_days: i64,
}

impl ServiceSettings {
    #[must_use]
    pub fn from_config(config: &CertifyConfig) -> Self {
        Self {
            app_type: config.general.app_type.clone(),
            paths: PathRewrite {
                production: config.files.production,
                production_prefix: config.files.production_prefix.clone(),
                development_prefix: config.files.development_prefix.clone(),
            },
            stale_application_days: config.dashboard.stale_application_days,
            audit_warning_days: config.dashboard.audit_warning_days,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&CertifyConfig::default())
    }
}

pub struct CertifyService {
    db: CertifyDb,
    settings: ServiceSettings,
}

impl CertifyService {
    /// Open (and migrate) a local database file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn new_local(db_path: &str, settings: ServiceSettings) -> Result<Self, DatabaseError> {
        let db = CertifyDb::open_local(db_path, &settings.app_type).await?;
        Ok(Self { db, settings })
    }

    /// Open the database named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn from_config(config: &CertifyConfig) -> Result<Self, DatabaseError> {
        Self::new_local(&config.database.path, ServiceSettings::from_config(config)).await
    }

    #[must_use]
    pub const fn from_db(db: CertifyDb, settings: ServiceSettings) -> Self {
        Self { db, settings }
    }

    #[must_use]
    pub const fn db(&self) -> &CertifyDb {
        &self.db
    }

    #[must_use]
    pub const fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Append to the `log` table with this service's prefix.
    pub async fn write_log(&self, entry: &str) {
        self.db.write_log(entry).await;
    }
}
