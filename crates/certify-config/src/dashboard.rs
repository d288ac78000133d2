//! Dashboard thresholds.

use serde::{Deserialize, Serialize};

const fn default_stale_application_days() -> i64 {
    30
}

const fn default_audit_warning_days() -> i64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Days without workflow activity before an open application is stale.
    #[serde(default = "default_stale_application_days")]
    pub stale_application_days: i64,

    /// Unplanned audits due within this many days raise a warning.
    #[serde(default = "default_audit_warning_days")]
    pub audit_warning_days: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stale_application_days: default_stale_application_days(),
            audit_warning_days: default_audit_warning_days(),
        }
    }
}
