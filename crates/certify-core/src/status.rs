//! Dashboard status counters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::StatusType;

/// A named count of outstanding work shown on the operations dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Status {
    #[serde(rename = "type")]
    pub status_type: StatusType,
    pub count: i64,
    pub name: String,
}

impl Status {
    /// Build the display form: `"1 Overdue CAR"`, `"0 Overdue CARs"`.
    #[must_use]
    pub fn from_count(status_type: StatusType, count: i64) -> Self {
        Self {
            status_type,
            count,
            name: display_name(count, status_type.base_name()),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.count > 0
    }
}

#[must_use]
pub fn display_name(count: i64, base: &str) -> String {
    if count == 1 {
        format!("{count} {base}")
    } else {
        format!("{count} {base}s")
    }
}
