//! Bearer token settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default token lifetime in hours.
const fn default_token_ttl_hours() -> u64 {
    8
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    #[serde(default)]
    pub signing_key: String,

    /// Hours before an issued token expires.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !self.signing_key.is_empty()
    }

    /// Check that tokens can be issued with these settings.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without a signing key, `InvalidValue` for a zero TTL.
    pub fn require_configured(&self) -> Result<(), ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "auth".into(),
            });
        }
        if self.token_ttl_hours == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.token_ttl_hours".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_by_default() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl_hours, 8);
        assert!(!config.is_configured());
        assert!(matches!(
            config.require_configured(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }

    #[test]
    fn zero_ttl_rejected() {
        let config = AuthConfig {
            signing_key: "secret".into(),
            token_ttl_hours: 0,
        };
        assert!(matches!(
            config.require_configured(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
