use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;

/// A phone number, email or other contact point for a client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientContact {
    pub id: i64,
    pub client_id: i64,
    pub list_contact_type_id: Option<i64>,
    pub name: Option<String>,
    pub preferred_name: Option<String>,
    pub details: Option<String>,
    pub is_default: bool,
    pub is_deleted: bool,
}

impl Default for ClientContact {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            client_id: UNSET_ID,
            list_contact_type_id: None,
            name: None,
            preferred_name: None,
            details: None,
            is_default: false,
            is_deleted: false,
        }
    }
}

/// Contact row as listed by the API, with the contact type resolved.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientContactListItem {
    pub id: i64,
    pub client_id: i64,
    pub name: Option<String>,
    pub preferred_name: Option<String>,
    #[serde(rename = "type")]
    pub contact_type: Option<String>,
    pub details: Option<String>,
    pub is_default: bool,
}
