use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;

/// Months between audits for a client that has never been scheduled.
pub const DEFAULT_AUDIT_CYCLE_FREQUENCY: i64 = 12;

/// When and by whom a client is normally audited.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientAuditCycle {
    pub id: i64,
    pub client_id: i64,
    pub preferred_auditor_user_id: Option<i64>,
    pub audit_cycle_frequency: Option<i64>,
    pub audit_cycle_month: Option<i64>,
    pub audit_cycle_day: Option<i64>,
}

impl ClientAuditCycle {
    /// A fresh cycle for `client_id` with the default frequency.
    #[must_use]
    pub const fn for_client(client_id: i64) -> Self {
        Self {
            id: UNSET_ID,
            client_id,
            preferred_auditor_user_id: None,
            audit_cycle_frequency: Some(DEFAULT_AUDIT_CYCLE_FREQUENCY),
            audit_cycle_month: None,
            audit_cycle_day: None,
        }
    }

    /// Saved, with an auditor and a day and month to schedule against.
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.id != UNSET_ID
            && self.preferred_auditor_user_id.is_some()
            && self.audit_cycle_month.is_some()
            && self.audit_cycle_day.is_some()
    }
}
