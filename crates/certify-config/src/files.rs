//! Network share path settings.

use serde::{Deserialize, Serialize};

fn default_production_prefix() -> String {
    "S:\\".to_string()
}

fn default_development_prefix() -> String {
    "Z:\\".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// When false, stored share paths are rewritten to the development prefix.
    #[serde(default)]
    pub production: bool,

    #[serde(default = "default_production_prefix")]
    pub production_prefix: String,

    #[serde(default = "default_development_prefix")]
    pub development_prefix: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            production: false,
            production_prefix: default_production_prefix(),
            development_prefix: default_development_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_development_drive_mapping() {
        let config = FilesConfig::default();
        assert!(!config.production);
        assert_eq!(config.production_prefix, "S:\\");
        assert_eq!(config.development_prefix, "Z:\\");
    }
}
