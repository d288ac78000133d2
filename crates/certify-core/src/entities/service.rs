use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;

/// A certification scheme offered to clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub abbreviation: Option<String>,
    pub reference: Option<String>,
    pub application_fee: Option<f64>,
    pub application_fee_xero_code: Option<String>,
    pub certification_fee: Option<f64>,
    pub certification_fee_xero_code: Option<String>,
    pub active: bool,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            name: String::new(),
            title: None,
            abbreviation: None,
            reference: None,
            application_fee: None,
            application_fee_xero_code: None,
            certification_fee: None,
            certification_fee_xero_code: None,
            active: true,
        }
    }
}

impl Service {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Per-client audit count for one service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStat {
    pub client: String,
    pub service: String,
    pub count: i64,
    pub initial_audit_date: Option<NaiveDate>,
}
