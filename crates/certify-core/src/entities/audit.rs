use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::UNSET_ID;

/// An inspection of a client's addresses against one or more services.
///
/// Auditor, type and status ids are the stored references; the matching
/// name fields are resolved on fetch for display.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: i64,
    pub client_id: i64,
    pub client_group_member_id: Option<i64>,
    pub company: Option<String>,
    pub application_id: Option<i64>,
    pub invoice_id: Option<i64>,
    pub lead_auditor_id: Option<i64>,
    pub lead_auditor: Option<String>,
    pub trainee_auditor_id: Option<i64>,
    pub trainee_auditor: Option<String>,
    pub audit_type_id: Option<i64>,
    pub audit_type: Option<String>,
    pub audit_status_id: Option<i64>,
    pub audit_status: Option<String>,
    pub notes: Option<String>,
    pub interviewees: Option<String>,
    pub documents_reviewed: Option<String>,
    pub date_due: Option<NaiveDate>,
    pub date_planned: Option<NaiveDate>,
    pub planned_start_time: Option<String>,
    pub date_inspected: Option<NaiveDate>,
    pub audit_start: Option<String>,
    pub audit_finish: Option<String>,
    pub audit_duration: Option<f64>,
    pub issues_discussed: bool,
    pub requires_testing: bool,
    pub audit_expenses: Option<f64>,
    pub testing_costs: Option<f64>,
    pub test_sample_location: Option<String>,
    pub is_test: bool,
    pub is_deleted: bool,
    pub services: Vec<AuditService>,
}

impl Default for Audit {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            client_id: UNSET_ID,
            client_group_member_id: None,
            company: None,
            application_id: None,
            invoice_id: None,
            lead_auditor_id: None,
            lead_auditor: None,
            trainee_auditor_id: None,
            trainee_auditor: None,
            audit_type_id: None,
            audit_type: None,
            audit_status_id: None,
            audit_status: None,
            notes: None,
            interviewees: None,
            documents_reviewed: None,
            date_due: None,
            date_planned: None,
            planned_start_time: None,
            date_inspected: None,
            audit_start: None,
            audit_finish: None,
            audit_duration: None,
            issues_discussed: false,
            requires_testing: false,
            audit_expenses: None,
            testing_costs: None,
            test_sample_location: None,
            is_test: false,
            is_deleted: false,
            services: Vec::new(),
        }
    }
}

impl Audit {
    /// An audit cannot be saved without a lead auditor, status and type.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first missing field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.lead_auditor_id.is_none() {
            return Err(CoreError::Validation(
                "Cannot save audit as no lead auditor has been set".into(),
            ));
        }
        if self.audit_status_id.is_none() {
            return Err(CoreError::Validation(
                "Cannot save audit as no audit status has been set".into(),
            ));
        }
        if self.audit_type_id.is_none() {
            return Err(CoreError::Validation(
                "Cannot save audit as no audit type has been set".into(),
            ));
        }
        Ok(())
    }

    /// Window title used by the desktop client.
    #[must_use]
    pub fn title(&self) -> String {
        let company = self.company.as_deref().unwrap_or_default();
        if self.id == UNSET_ID {
            format!("New Audit for {company}")
        } else {
            format!(
                "Audit for {company}, Audit ID: {}, Status: {}",
                self.id,
                self.audit_status.as_deref().unwrap_or_default()
            )
        }
    }
}

/// A service covered by an audit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditService {
    pub id: i64,
    pub audit_id: i64,
    pub service_id: i64,
    pub service: Option<String>,
}

/// An address visited during an audit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditAddress {
    pub id: i64,
    pub audit_id: i64,
    pub client_address_id: i64,
}
