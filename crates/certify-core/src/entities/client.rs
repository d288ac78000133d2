use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ClientAuditCycle, ClientCategory, ClientService};
use crate::ids::UNSET_ID;

/// A certified organisation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub company: String,
    pub abn: Option<String>,
    pub consultant_name: Option<String>,
    pub agreement_file_link: Option<String>,
    pub agreement_hash: Option<String>,
    pub trading_as: Option<String>,
    pub notes: Option<String>,
    pub audit_notes: Option<String>,
    pub is_deleted: bool,
    pub is_test: bool,
    pub categories: Vec<ClientCategory>,
    pub services: Vec<ClientService>,
    pub audit_cycle: Option<ClientAuditCycle>,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            company: String::new(),
            abn: None,
            consultant_name: None,
            agreement_file_link: None,
            agreement_hash: None,
            trading_as: None,
            notes: None,
            audit_notes: None,
            is_deleted: false,
            is_test: false,
            categories: Vec::new(),
            services: Vec::new(),
            audit_cycle: None,
        }
    }
}

impl Client {
    #[must_use]
    pub fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_service(&self, service_id: i64) -> bool {
        self.services.iter().any(|s| s.service_id == service_id)
    }

    #[must_use]
    pub fn has_category(&self, list_client_category_id: i64) -> bool {
        self.categories
            .iter()
            .any(|c| c.list_client_category_id == list_client_category_id)
    }
}

/// `[id, company]` pair used by client pickers. Serializes as a JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ClientListItem(pub String, pub String);

/// Normalise a company name for matching: punctuation becomes spaces and
/// runs of whitespace collapse to one.
#[must_use]
pub fn clean_client_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if matches!(c, '.' | ',' | '\'' | '/') { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
