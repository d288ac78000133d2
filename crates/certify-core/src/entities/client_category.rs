use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;

/// An operational category a client is certified under, e.g. "Viticulture".
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientCategory {
    pub id: i64,
    pub client_id: i64,
    pub list_client_category_id: i64,
    pub name: Option<String>,
}

impl Default for ClientCategory {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            client_id: UNSET_ID,
            list_client_category_id: UNSET_ID,
            name: None,
        }
    }
}
