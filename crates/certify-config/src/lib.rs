//! # certify-config
//!
//! Layered configuration loading for Certify using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CERTIFY_*` prefix, `__` as separator)
//! 2. Project-level `.certify/config.toml`
//! 3. User-level `~/.config/certify/config.toml`
//! 4. Built-in defaults
//!
//! `CERTIFY_AUTH__SIGNING_KEY` maps to `auth.signing_key`,
//! `CERTIFY_SERVER__BIND` to `server.bind`, and so on.
//!
//! # Usage
//!
//! ```no_run
//! use certify_config::CertifyConfig;
//!
//! let config = CertifyConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod auth;
mod dashboard;
mod database;
mod error;
mod files;
mod general;
mod server;

pub use auth::AuthConfig;
pub use dashboard::DashboardConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use files::FilesConfig;
pub use general::GeneralConfig;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CertifyConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl CertifyConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does not read `.env`; use [`Self::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load `.env` first, then every other source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the CLI can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".certify/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("CERTIFY_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("certify").join("config.toml"))
    }

    /// Walk up from `CARGO_MANIFEST_DIR` (crate, crates/, workspace) looking
    /// for `.env`, then fall back to the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = CertifyConfig::default();
        assert!(!config.auth.is_configured());
        assert!(!config.files.production);
        assert_eq!(config.dashboard.audit_warning_days, 30);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: CertifyConfig = CertifyConfig::figment().extract()?;
            assert_eq!(config.database.path, "certify.db");
            assert_eq!(config.auth.token_ttl_hours, 8);
            Ok(())
        });
    }
}
