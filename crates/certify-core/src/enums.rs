//! Dashboard status types, roles, and list criteria.
//!
//! `StatusType` serializes with the dashboard's SCREAMING names so the
//! desktop client and the REST surface share one vocabulary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// StatusType
// ---------------------------------------------------------------------------

/// One dashboard counter. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusType {
    NewProduct,
    NewIngredient,
    NewRecipe,
    NewLabel,
    NewApplication,
    StaleApplication,
    ApplicationReadyForDecision,
    Derogation,
    InspectedAudit,
    AuditWarning,
    RejectedAudit,
    OverdueCar,
    EndingRestriction,
    OverdueQualityCar,
    CertificateWarning,
    BusinessDevelopmentReminder,
    ClientUpdate,
}

impl StatusType {
    pub const ALL: [Self; 17] = [
        Self::NewProduct,
        Self::NewIngredient,
        Self::NewRecipe,
        Self::NewLabel,
        Self::NewApplication,
        Self::StaleApplication,
        Self::ApplicationReadyForDecision,
        Self::Derogation,
        Self::InspectedAudit,
        Self::AuditWarning,
        Self::RejectedAudit,
        Self::OverdueCar,
        Self::EndingRestriction,
        Self::OverdueQualityCar,
        Self::CertificateWarning,
        Self::BusinessDevelopmentReminder,
        Self::ClientUpdate,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewProduct => "NEW_PRODUCT",
            Self::NewIngredient => "NEW_INGREDIENT",
            Self::NewRecipe => "NEW_RECIPE",
            Self::NewLabel => "NEW_LABEL",
            Self::NewApplication => "NEW_APPLICATION",
            Self::StaleApplication => "STALE_APPLICATION",
            Self::ApplicationReadyForDecision => "APPLICATION_READY_FOR_DECISION",
            Self::Derogation => "DEROGATION",
            Self::InspectedAudit => "INSPECTED_AUDIT",
            Self::AuditWarning => "AUDIT_WARNING",
            Self::RejectedAudit => "REJECTED_AUDIT",
            Self::OverdueCar => "OVERDUE_CAR",
            Self::EndingRestriction => "ENDING_RESTRICTION",
            Self::OverdueQualityCar => "OVERDUE_QUALITY_CAR",
            Self::CertificateWarning => "CERTIFICATE_WARNING",
            Self::BusinessDevelopmentReminder => "BUSINESS_DEVELOPMENT_REMINDER",
            Self::ClientUpdate => "CLIENT_UPDATE",
        }
    }

    /// Singular label shown after the count, e.g. `"3 Overdue CARs"`.
    #[must_use]
    pub const fn base_name(self) -> &'static str {
        match self {
            Self::NewProduct => "New Product",
            Self::NewIngredient => "New Ingredient",
            Self::NewRecipe => "New Recipe",
            Self::NewLabel => "New Label",
            Self::NewApplication => "New Application",
            Self::StaleApplication => "Stale Application",
            Self::ApplicationReadyForDecision => "Decision",
            Self::Derogation => "New Derogation",
            Self::InspectedAudit => "Inspected Audit",
            Self::AuditWarning => "Audit Warning",
            Self::RejectedAudit => "Rejected Audit",
            Self::OverdueCar => "Overdue CAR",
            Self::EndingRestriction => "Restriction End",
            Self::OverdueQualityCar => "Quality CAR",
            Self::CertificateWarning => "Cert Warning",
            Self::BusinessDevelopmentReminder => "BD Reminder",
            Self::ClientUpdate => "Client Update",
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the SCREAMING name in any case, or the zero-based position.
impl FromStr for StatusType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::ALL
                .get(index)
                .copied()
                .ok_or_else(|| CoreError::Validation(format!("unknown status index {index}")));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Validation(format!("unknown status type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// ApiRole
// ---------------------------------------------------------------------------

/// Role claim carried in a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApiRole {
    Web,
    Auditor,
    Admin,
}

impl ApiRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Auditor => "auditor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for ApiRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// A per-user role row. Each variant owns exactly one table, so role
/// queries never interpolate caller input into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Web,
    Auditor,
    Staff,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Auditor => "auditor",
            Self::Staff => "staff",
        }
    }

    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Web => "user_web",
            Self::Auditor => "user_auditor",
            Self::Staff => "user_staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "auditor" => Ok(Self::Auditor),
            "staff" => Ok(Self::Staff),
            other => Err(CoreError::Validation(format!("unknown user role '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ListCriteria
// ---------------------------------------------------------------------------

/// Filter for audit and application lists.
///
/// `open` selects live, non-test records that are not finished or
/// cancelled. Any other value must match the status/workflow name exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCriteria {
    Open,
    Exact(String),
}

impl From<&str> for ListCriteria {
    fn from(value: &str) -> Self {
        if value == "open" {
            Self::Open
        } else {
            Self::Exact(value.to_string())
        }
    }
}
