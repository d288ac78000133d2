//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_app_type() -> String {
    "Certify API".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Prefix written on every `log` table entry from this process.
    #[serde(default = "default_app_type")]
    pub app_type: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_type: default_app_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(GeneralConfig::default().app_type, "Certify API");
    }
}
