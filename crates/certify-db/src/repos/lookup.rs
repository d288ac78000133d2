//! Lookup-list repository: name/id resolution for the `list_*` tables.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use certify_core::errors::CoreError;

use crate::error::DatabaseError;
use crate::helpers::{get_string, text};
use crate::service::CertifyService;

/// A name/id lookup table. Variants are the only table names that reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupList {
    State,
    Country,
    ClientCategory,
    ContactType,
    AuditStatus,
    AuditType,
    ClientAddressModifier,
    ClientAddressUse,
    ServiceStatus,
}

impl LookupList {
    pub const ALL: [Self; 9] = [
        Self::State,
        Self::Country,
        Self::ClientCategory,
        Self::ContactType,
        Self::AuditStatus,
        Self::AuditType,
        Self::ClientAddressModifier,
        Self::ClientAddressUse,
        Self::ServiceStatus,
    ];

    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::State => "list_state",
            Self::Country => "list_country",
            Self::ClientCategory => "list_client_category",
            Self::ContactType => "list_contact_type",
            Self::AuditStatus => "list_audit_status",
            Self::AuditType => "list_audit_type",
            Self::ClientAddressModifier => "list_client_address_modifier",
            Self::ClientAddressUse => "list_client_address_use",
            Self::ServiceStatus => "service_status",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Country => "country",
            Self::ClientCategory => "client_category",
            Self::ContactType => "contact_type",
            Self::AuditStatus => "audit_status",
            Self::AuditType => "audit_type",
            Self::ClientAddressModifier => "client_address_modifier",
            Self::ClientAddressUse => "client_address_use",
            Self::ServiceStatus => "service_status",
        }
    }
}

impl fmt::Display for LookupList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupList {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|list| list.as_str() == wanted)
            .ok_or_else(|| CoreError::Validation(format!("unknown lookup list '{s}'")))
    }
}

impl CertifyService {
    /// Id of the row named `name`, if any.
    pub async fn lookup_id(&self, list: LookupList, name: &str) -> Result<Option<i64>, DatabaseError> {
        let sql = format!("SELECT id FROM {} WHERE name = ?1 LIMIT 1", list.table_name());
        self.db()
            .query_one(&sql, vec![text(name.trim())], |row| Ok(row.get::<i64>(0)?))
            .await
    }

    pub async fn lookup_name(&self, list: LookupList, id: i64) -> Result<Option<String>, DatabaseError> {
        let sql = format!("SELECT name FROM {} WHERE id = ?1", list.table_name());
        self.db()
            .query_one(&sql, vec![id.into()], |row| get_string(row, 0))
            .await
    }

    pub async fn lookup_names(&self, list: LookupList) -> Result<Vec<String>, DatabaseError> {
        let sql = format!("SELECT name FROM {} ORDER BY name", list.table_name());
        self.db().query_map(&sql, vec![], |row| get_string(row, 0)).await
    }

    /// Return the id for `name`, inserting the row first if it is new.
    pub async fn ensure_lookup(&self, list: LookupList, name: &str) -> Result<i64, DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::validation(format!("{list} name cannot be empty")));
        }
        if let Some(id) = self.lookup_id(list, name).await? {
            return Ok(id);
        }
        let sql = format!("INSERT INTO {} (name) VALUES (?1)", list.table_name());
        self.db().insert(&sql, vec![text(name)]).await
    }

    /// Add a state with its abbreviation.
    pub async fn ensure_state(&self, name: &str, abbreviation: &str) -> Result<i64, DatabaseError> {
        let id = self.ensure_lookup(LookupList::State, name).await?;
        self.db()
            .execute(
                "UPDATE list_state SET abbreviation = ?1 WHERE id = ?2",
                vec![text(abbreviation), id.into()],
            )
            .await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn ensure_lookup_is_idempotent() {
        let (svc, _dir) = test_service().await;
        let first = svc.ensure_lookup(LookupList::AuditStatus, "Allocated").await.unwrap();
        let second = svc.ensure_lookup(LookupList::AuditStatus, " Allocated ").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            svc.lookup_name(LookupList::AuditStatus, first).await.unwrap().as_deref(),
            Some("Allocated")
        );
    }

    #[tokio::test]
    async fn unknown_name_is_none() {
        let (svc, _dir) = test_service().await;
        assert_eq!(svc.lookup_id(LookupList::Country, "Atlantis").await.unwrap(), None);
        assert!(svc.ensure_lookup(LookupList::Country, "  ").await.is_err());
    }

    #[tokio::test]
    async fn names_are_sorted() {
        let (svc, _dir) = test_service().await;
        for name in ["Processor", "Grower", "Wholesaler"] {
            svc.ensure_lookup(LookupList::ClientCategory, name).await.unwrap();
        }
        assert_eq!(
            svc.lookup_names(LookupList::ClientCategory).await.unwrap(),
            vec!["Grower", "Processor", "Wholesaler"]
        );
    }

    #[test]
    fn lookup_list_parses_kebab_and_snake() {
        assert_eq!("audit-status".parse::<LookupList>().unwrap(), LookupList::AuditStatus);
        assert_eq!("contact_type".parse::<LookupList>().unwrap(), LookupList::ContactType);
        assert!("users".parse::<LookupList>().is_err());
    }
}
