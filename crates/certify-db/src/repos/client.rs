//! Client repository: fetch with children, save, soft delete, name lookup.

use chrono::NaiveDate;

use certify_core::entities::{Client, ClientAuditCycle, ClientListItem, clean_client_name};
use certify_core::ids::UNSET_ID;
use certify_core::names::{AUDIT_TYPE_ANNUAL, AUDIT_TYPE_INITIAL};

use crate::error::DatabaseError;
use crate::helpers::{
    flag, get_flag, get_opt_date, get_opt_string, get_string, opt_text, text,
};
use crate::service::CertifyService;

const CLIENT_COLUMNS: &str = "id, company, abn, consultant_name, agreement_file_link, agreement_hash,
     trading_as, notes, audit_notes, is_test, is_deleted";

fn row_to_client(row: &libsql::Row) -> Result<Client, DatabaseError> {
    Ok(Client {
        id: row.get::<i64>(0)?,
        company: get_string(row, 1)?,
        abn: get_opt_string(row, 2)?,
        consultant_name: get_opt_string(row, 3)?,
        agreement_file_link: get_opt_string(row, 4)?,
        agreement_hash: get_opt_string(row, 5)?,
        trading_as: get_opt_string(row, 6)?,
        notes: get_opt_string(row, 7)?,
        audit_notes: get_opt_string(row, 8)?,
        is_test: get_flag(row, 9)?,
        is_deleted: get_flag(row, 10)?,
        categories: Vec::new(),
        services: Vec::new(),
        audit_cycle: None,
    })
}

impl CertifyService {
    /// Load a client with its live categories, services and audit cycle.
    ///
    /// A client without an audit cycle gets a default one persisted here.
    pub async fn fetch_client(&self, id: i64) -> Result<Client, DatabaseError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1");
        let mut client = self
            .db()
            .query_one(&sql, vec![id.into()], row_to_client)
            .await?
            .ok_or_else(|| DatabaseError::not_found("client", id))?;

        client.categories = self.categories_for_client(id).await?;
        client.services = self.services_for_client(id).await?;
        client.audit_cycle = Some(match self.audit_cycle_for_client(id).await? {
            Some(cycle) => cycle,
            None => {
                let mut cycle = ClientAuditCycle::for_client(id);
                cycle.id = self.save_audit_cycle(&cycle).await?;
                cycle
            }
        });
        Ok(client)
    }

    /// Insert or update a client. Returns the client id.
    ///
    /// Agreement fields are only written on update, along with the audit cycle.
    pub async fn save_client(&self, client: &Client) -> Result<i64, DatabaseError> {
        if client.company.trim().is_empty() {
            return Err(DatabaseError::validation("Client company name cannot be empty"));
        }

        if client.id == UNSET_ID {
            return self
                .db()
                .insert(
                    "INSERT INTO clients (company, abn, trading_as, consultant_name, notes, audit_notes, is_test)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    vec![
                        text(&client.company),
                        opt_text(client.abn.as_deref()),
                        opt_text(client.trading_as.as_deref()),
                        opt_text(client.consultant_name.as_deref()),
                        opt_text(client.notes.as_deref()),
                        opt_text(client.audit_notes.as_deref()),
                        flag(client.is_test),
                    ],
                )
                .await;
        }

        self.db()
            .execute(
                "UPDATE clients SET company = ?1, abn = ?2, trading_as = ?3, consultant_name = ?4,
                 notes = ?5, audit_notes = ?6, is_test = ?7, agreement_file_link = ?8, agreement_hash = ?9
                 WHERE id = ?10",
                vec![
                    text(&client.company),
                    opt_text(client.abn.as_deref()),
                    opt_text(client.trading_as.as_deref()),
                    opt_text(client.consultant_name.as_deref()),
                    opt_text(client.notes.as_deref()),
                    opt_text(client.audit_notes.as_deref()),
                    flag(client.is_test),
                    opt_text(client.agreement_file_link.as_deref()),
                    opt_text(client.agreement_hash.as_deref()),
                    client.id.into(),
                ],
            )
            .await?;

        if let Some(cycle) = &client.audit_cycle {
            let cycle = ClientAuditCycle {
                client_id: client.id,
                ..cycle.clone()
            };
            self.save_audit_cycle(&cycle).await?;
        }
        Ok(client.id)
    }

    pub async fn delete_client(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute("UPDATE clients SET is_deleted = 1 WHERE id = ?1", vec![id.into()])
            .await?;
        Ok(())
    }

    /// Id of the one live client whose company or trading name is `name`.
    ///
    /// No match and ambiguous matches both return `None`.
    pub async fn client_id_by_name(&self, name: &str) -> Result<Option<i64>, DatabaseError> {
        let ids = self
            .db()
            .query_map(
                "SELECT id FROM clients WHERE (company = ?1 OR trading_as = ?1) AND is_deleted = 0",
                vec![text(name.trim())],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await?;
        Ok(match ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        })
    }

    /// Like [`Self::client_id_by_name`] after normalising punctuation on both sides.
    pub async fn client_id_by_clean_name(&self, name: &str) -> Result<Option<i64>, DatabaseError> {
        let wanted = clean_client_name(name);
        let candidates = self
            .db()
            .query_map(
                "SELECT id, company, trading_as FROM clients WHERE is_deleted = 0",
                vec![],
                |row| {
                    Ok((
                        row.get::<i64>(0)?,
                        get_string(row, 1)?,
                        get_opt_string(row, 2)?,
                    ))
                },
            )
            .await?;
        let matches: Vec<i64> = candidates
            .into_iter()
            .filter(|(_, company, trading_as)| {
                clean_client_name(company).eq_ignore_ascii_case(&wanted)
                    || trading_as
                        .as_deref()
                        .is_some_and(|t| clean_client_name(t).eq_ignore_ascii_case(&wanted))
            })
            .map(|(id, _, _)| id)
            .collect();
        Ok(match matches.as_slice() {
            [id] => Some(*id),
            _ => None,
        })
    }

    /// `[id, company]` pairs of live, non-test clients ordered by company.
    ///
    /// A non-positive `max_count` returns every client.
    pub async fn list_clients(&self, max_count: i64) -> Result<Vec<ClientListItem>, DatabaseError> {
        let limit = if max_count > 0 { max_count } else { -1 };
        self.db()
            .query_map(
                "SELECT id, company FROM clients
                 WHERE is_deleted = 0 AND is_test = 0
                 ORDER BY company
                 LIMIT ?1",
                vec![limit.into()],
                |row| Ok(ClientListItem(row.get::<i64>(0)?.to_string(), get_string(row, 1)?)),
            )
            .await
    }

    pub async fn is_group_member(&self, client_id: i64) -> Result<bool, DatabaseError> {
        self.db()
            .exists(
                "SELECT COUNT(*) FROM client_group_members WHERE client_id = ?1 AND is_deleted = 0",
                vec![client_id.into()],
            )
            .await
    }

    pub async fn client_has_service(&self, client_id: i64, service_id: i64) -> Result<bool, DatabaseError> {
        self.db()
            .exists(
                "SELECT COUNT(*) FROM client_services
                 WHERE client_id = ?1 AND service_id = ?2 AND is_deleted = 0",
                vec![client_id.into(), service_id.into()],
            )
            .await
    }

    pub async fn client_has_category(
        &self,
        client_id: i64,
        list_client_category_id: i64,
    ) -> Result<bool, DatabaseError> {
        self.db()
            .exists(
                "SELECT COUNT(*) FROM client_categories
                 WHERE client_id = ?1 AND list_client_category_id = ?2 AND is_deleted = 0",
                vec![client_id.into(), list_client_category_id.into()],
            )
            .await
    }

    /// The state shared by every live address that has one.
    ///
    /// `None` when the addresses span more than one state or none is set.
    pub async fn client_state_id(&self, client_id: i64) -> Result<Option<i64>, DatabaseError> {
        let states = self
            .db()
            .query_map(
                "SELECT DISTINCT list_state_id FROM client_addresses
                 WHERE client_id = ?1 AND is_deleted = 0 AND list_state_id IS NOT NULL",
                vec![client_id.into()],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await?;
        Ok(match states.as_slice() {
            [only] => Some(*only),
            _ => None,
        })
    }

    pub async fn is_multi_state(&self, client_id: i64) -> Result<bool, DatabaseError> {
        let states = self
            .db()
            .count(
                "SELECT COUNT(DISTINCT list_state_id) FROM client_addresses
                 WHERE client_id = ?1 AND is_deleted = 0",
                vec![client_id.into()],
            )
            .await?;
        Ok(states > 1)
    }

    /// National Standard produce categories behind the client's live categories.
    pub async fn national_standard_categories(&self, client_id: i64) -> Result<Vec<String>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT DISTINCT l.national_standard_category
                 FROM client_categories cc
                 JOIN list_client_category l ON l.id = cc.list_client_category_id
                 WHERE cc.client_id = ?1 AND cc.is_deleted = 0
                   AND COALESCE(l.national_standard_category, '') <> ''
                 ORDER BY l.national_standard_category",
                vec![client_id.into()],
                |row| get_string(row, 0),
            )
            .await
    }

    /// Due date of the client's latest live annual or initial audit.
    pub async fn last_annual_audit_due_date(&self, client_id: i64) -> Result<Option<NaiveDate>, DatabaseError> {
        Ok(self
            .db()
            .query_one(
                "SELECT MAX(a.date_due)
                 FROM audits a
                 JOIN list_audit_type t ON t.id = a.list_audit_type_id
                 WHERE a.client_id = ?1 AND a.is_deleted = 0 AND t.name IN (?2, ?3)",
                vec![client_id.into(), text(AUDIT_TYPE_ANNUAL), text(AUDIT_TYPE_INITIAL)],
                |row| get_opt_date(row, 0),
            )
            .await?
            .flatten())
    }

    /// Earliest due date among the client's live audits not yet inspected.
    pub async fn next_scheduled_audit_due_date(
        &self,
        client_id: i64,
    ) -> Result<Option<NaiveDate>, DatabaseError> {
        Ok(self
            .db()
            .query_one(
                "SELECT MIN(date_due) FROM audits
                 WHERE client_id = ?1 AND is_deleted = 0 AND date_inspected IS NULL",
                vec![client_id.into()],
                |row| get_opt_date(row, 0),
            )
            .await?
            .flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::lookup::LookupList;
    use crate::test_support::helpers::{seed_client, test_service};
    use certify_core::entities::ClientCategory;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn save_then_fetch() {
        let (svc, _dir) = test_service().await;
        let mut client = Client::new("Acme Organics");
        client.abn = Some("12 345 678 901".into());
        client.trading_as = Some("Acme Fresh".into());
        client.agreement_hash = Some("ignored-on-insert".into());

        let id = svc.save_client(&client).await.unwrap();
        let fetched = svc.fetch_client(id).await.unwrap();

        assert_eq!(fetched.company, "Acme Organics");
        assert_eq!(fetched.abn.as_deref(), Some("12 345 678 901"));
        assert_eq!(fetched.trading_as.as_deref(), Some("Acme Fresh"));
        assert_eq!(fetched.agreement_hash, None);
    }

    #[tokio::test]
    async fn fetch_creates_missing_audit_cycle_once() {
        let (svc, _dir) = test_service().await;
        let id = seed_client(&svc, "Cycle Co").await;

        let first = svc.fetch_client(id).await.unwrap();
        let cycle = first.audit_cycle.unwrap();
        assert_eq!(cycle.audit_cycle_frequency, Some(12));
        assert_ne!(cycle.id, UNSET_ID);

        let second = svc.fetch_client(id).await.unwrap();
        assert_eq!(second.audit_cycle.unwrap().id, cycle.id);
        let cycles = svc
            .db()
            .count(
                "SELECT COUNT(*) FROM client_audit_cycles WHERE client_id = ?1",
                vec![id.into()],
            )
            .await
            .unwrap();
        assert_eq!(cycles, 1);
    }

    #[tokio::test]
    async fn update_writes_agreement_and_cycle() {
        let (svc, _dir) = test_service().await;
        let id = seed_client(&svc, "Update Co").await;
        let mut client = svc.fetch_client(id).await.unwrap();

        client.agreement_file_link = Some("S:\\Agreements\\update.pdf".into());
        client.agreement_hash = Some("abc123".into());
        if let Some(cycle) = client.audit_cycle.as_mut() {
            cycle.audit_cycle_month = Some(6);
        }
        svc.save_client(&client).await.unwrap();

        let fetched = svc.fetch_client(id).await.unwrap();
        assert_eq!(fetched.agreement_hash.as_deref(), Some("abc123"));
        assert_eq!(fetched.audit_cycle.unwrap().audit_cycle_month, Some(6));
    }

    #[tokio::test]
    async fn empty_company_is_rejected() {
        let (svc, _dir) = test_service().await;
        let err = svc.save_client(&Client::new("  ")).await.unwrap_err();
        assert!(err.to_string().contains("company"));
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let (svc, _dir) = test_service().await;
        let err = svc.fetch_client(404).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_excludes_deleted_and_test_clients() {
        let (svc, _dir) = test_service().await;
        let zeta = seed_client(&svc, "Zeta Farms").await;
        let alpha = seed_client(&svc, "Alpha Dairy").await;
        let gone = seed_client(&svc, "Gone Pty").await;
        svc.delete_client(gone).await.unwrap();
        svc.save_client(&Client {
            is_test: true,
            ..Client::new("Test Client")
        })
        .await
        .unwrap();

        let list = svc.list_clients(0).await.unwrap();
        assert_eq!(
            list,
            vec![
                ClientListItem(alpha.to_string(), "Alpha Dairy".into()),
                ClientListItem(zeta.to_string(), "Zeta Farms".into()),
            ]
        );
        assert_eq!(svc.list_clients(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn id_by_name_needs_exactly_one_match() {
        let (svc, _dir) = test_service().await;
        let id = svc
            .save_client(&Client {
                trading_as: Some("Sunny Side".into()),
                ..Client::new("Sunny Pty Ltd")
            })
            .await
            .unwrap();
        assert_eq!(svc.client_id_by_name("Sunny Side").await.unwrap(), Some(id));
        assert_eq!(svc.client_id_by_name("Sunny Pty Ltd").await.unwrap(), Some(id));
        assert_eq!(svc.client_id_by_clean_name("sunny pty. ltd").await.unwrap(), Some(id));

        seed_client(&svc, "Sunny Side").await;
        assert_eq!(svc.client_id_by_name("Sunny Side").await.unwrap(), None);
        assert_eq!(svc.client_id_by_name("Nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn group_membership() {
        let (svc, _dir) = test_service().await;
        let id = seed_client(&svc, "Grouped").await;
        assert!(!svc.is_group_member(id).await.unwrap());
        svc.db()
            .insert(
                "INSERT INTO client_group_members (client_id, group_name) VALUES (?1, 'Co-op')",
                vec![id.into()],
            )
            .await
            .unwrap();
        assert!(svc.is_group_member(id).await.unwrap());
    }

    async fn address_in(svc: &CertifyService, client_id: i64, state_id: Option<i64>) -> i64 {
        svc.db()
            .insert(
                "INSERT INTO client_addresses (client_id, list_state_id) VALUES (?1, ?2)",
                vec![client_id.into(), crate::helpers::opt_id(state_id)],
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn state_rules_follow_live_addresses() {
        let (svc, _dir) = test_service().await;
        let id = seed_client(&svc, "Border Farms").await;
        let nsw = svc.ensure_state("New South Wales", "NSW").await.unwrap();
        let vic = svc.ensure_state("Victoria", "VIC").await.unwrap();
        assert_eq!(svc.client_state_id(id).await.unwrap(), None);

        address_in(&svc, id, Some(nsw)).await;
        address_in(&svc, id, None).await;
        assert_eq!(svc.client_state_id(id).await.unwrap(), Some(nsw));
        assert!(!svc.is_multi_state(id).await.unwrap());

        let other = address_in(&svc, id, Some(vic)).await;
        assert_eq!(svc.client_state_id(id).await.unwrap(), None);
        assert!(svc.is_multi_state(id).await.unwrap());

        svc.delete_client_address(other).await.unwrap();
        assert_eq!(svc.client_state_id(id).await.unwrap(), Some(nsw));
    }

    #[tokio::test]
    async fn single_state_client_is_not_multi_state() {
        let (svc, _dir) = test_service().await;
        let id = seed_client(&svc, "One State Co").await;
        let qld = svc.ensure_state("Queensland", "QLD").await.unwrap();
        address_in(&svc, id, Some(qld)).await;
        address_in(&svc, id, Some(qld)).await;
        assert!(!svc.is_multi_state(id).await.unwrap());
    }

    #[tokio::test]
    async fn national_standard_categories_are_distinct() {
        let (svc, _dir) = test_service().await;
        let id = seed_client(&svc, "Produce Co").await;
        let mut categories = Vec::new();
        for (name, standard) in [
            ("Grower", Some("Crop")),
            ("Orchard", Some("Crop")),
            ("Dairy", Some("Livestock")),
            ("Retail", None),
        ] {
            let list_id = svc.ensure_lookup(LookupList::ClientCategory, name).await.unwrap();
            svc.db()
                .execute(
                    "UPDATE list_client_category SET national_standard_category = ?1 WHERE id = ?2",
                    vec![opt_text(standard), list_id.into()],
                )
                .await
                .unwrap();
            categories.push(list_id);
        }
        for list_client_category_id in &categories {
            svc.save_client_category(&ClientCategory {
                client_id: id,
                list_client_category_id: *list_client_category_id,
                ..ClientCategory::default()
            })
            .await
            .unwrap();
        }

        assert_eq!(
            svc.national_standard_categories(id).await.unwrap(),
            vec!["Crop", "Livestock"]
        );
    }

    #[tokio::test]
    async fn audit_due_dates() {
        let (svc, _dir) = test_service().await;
        let id = seed_client(&svc, "Due Co").await;
        let annual = svc.ensure_lookup(LookupList::AuditType, "Annual").await.unwrap();
        let unannounced = svc.ensure_lookup(LookupList::AuditType, "Unannounced").await.unwrap();
        assert_eq!(svc.last_annual_audit_due_date(id).await.unwrap(), None);
        assert_eq!(svc.next_scheduled_audit_due_date(id).await.unwrap(), None);

        for (audit_type, due, inspected) in [
            (annual, "2024-05-01", Some("2024-05-03")),
            (annual, "2025-05-01", None),
            (unannounced, "2025-08-01", None),
        ] {
            svc.db()
                .insert(
                    "INSERT INTO audits (client_id, list_audit_type_id, date_due, date_inspected)
                     VALUES (?1, ?2, ?3, ?4)",
                    vec![id.into(), audit_type.into(), due.into(), opt_text(inspected)],
                )
                .await
                .unwrap();
        }

        let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(
            svc.last_annual_audit_due_date(id).await.unwrap(),
            Some(day("2025-05-01"))
        );
        assert_eq!(
            svc.next_scheduled_audit_due_date(id).await.unwrap(),
            Some(day("2025-05-01"))
        );
    }
}
