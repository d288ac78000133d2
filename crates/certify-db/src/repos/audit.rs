//! Audit repository.
//!
//! Fetches resolve the company, auditor names and type/status names, and
//! attach the audit's services.

use chrono::NaiveDate;
use serde::Serialize;

use certify_core::entities::{Audit, AuditService};
use certify_core::enums::ListCriteria;
use certify_core::ids::UNSET_ID;
use certify_core::names::{AUDIT_STATUS_CANCELLED, AUDIT_STATUS_FINISHED};

use crate::error::DatabaseError;
use crate::helpers::{
    flag, get_flag, get_opt_date, get_opt_id, get_opt_real, get_opt_string, opt_date, opt_id,
    opt_real, opt_text, text,
};
use crate::service::CertifyService;

/// One of the dates stamped on an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditDate {
    Due,
    Planned,
    Inspected,
}

impl AuditDate {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Due => "date_due",
            Self::Planned => "date_planned",
            Self::Inspected => "date_inspected",
        }
    }
}

const AUDIT_SELECT: &str = "SELECT a.id, a.client_id, a.client_group_member_id, c.company, a.application_id,
     a.invoice_id, a.lead_auditor_id, lu.full_name, a.trainee_auditor_id, tu.full_name,
     a.list_audit_type_id, t.name, a.list_audit_status_id, s.name, a.notes, a.interviewees,
     a.documents_reviewed, a.date_due, a.date_planned, a.planned_start_time, a.date_inspected,
     a.audit_start, a.audit_finish, a.audit_duration, a.issues_discussed, a.requires_testing,
     a.audit_expenses, a.testing_costs, a.test_sample_location, c.is_test, a.is_deleted
     FROM audits a
     JOIN clients c ON c.id = a.client_id
     LEFT JOIN user_auditor la ON la.id = a.lead_auditor_id
     LEFT JOIN users lu ON lu.id = la.user_id
     LEFT JOIN user_auditor ta ON ta.id = a.trainee_auditor_id
     LEFT JOIN users tu ON tu.id = ta.user_id
     LEFT JOIN list_audit_type t ON t.id = a.list_audit_type_id
     LEFT JOIN list_audit_status s ON s.id = a.list_audit_status_id";

fn row_to_audit(row: &libsql::Row) -> Result<Audit, DatabaseError> {
    Ok(Audit {
        id: row.get::<i64>(0)?,
        client_id: row.get::<i64>(1)?,
        client_group_member_id: get_opt_id(row, 2)?,
        company: get_opt_string(row, 3)?,
        application_id: get_opt_id(row, 4)?,
        invoice_id: get_opt_id(row, 5)?,
        lead_auditor_id: get_opt_id(row, 6)?,
        lead_auditor: get_opt_string(row, 7)?,
        trainee_auditor_id: get_opt_id(row, 8)?,
        trainee_auditor: get_opt_string(row, 9)?,
        audit_type_id: get_opt_id(row, 10)?,
        audit_type: get_opt_string(row, 11)?,
        audit_status_id: get_opt_id(row, 12)?,
        audit_status: get_opt_string(row, 13)?,
        notes: get_opt_string(row, 14)?,
        interviewees: get_opt_string(row, 15)?,
        documents_reviewed: get_opt_string(row, 16)?,
        date_due: get_opt_date(row, 17)?,
        date_planned: get_opt_date(row, 18)?,
        planned_start_time: get_opt_string(row, 19)?,
        date_inspected: get_opt_date(row, 20)?,
        audit_start: get_opt_string(row, 21)?,
        audit_finish: get_opt_string(row, 22)?,
        audit_duration: get_opt_real(row, 23)?,
        issues_discussed: get_flag(row, 24)?,
        requires_testing: get_flag(row, 25)?,
        audit_expenses: get_opt_real(row, 26)?,
        testing_costs: get_opt_real(row, 27)?,
        test_sample_location: get_opt_string(row, 28)?,
        is_test: get_flag(row, 29)?,
        is_deleted: get_flag(row, 30)?,
        services: Vec::new(),
    })
}

impl CertifyService {
    pub async fn fetch_audit(&self, id: i64) -> Result<Audit, DatabaseError> {
        let sql = format!("{AUDIT_SELECT} WHERE a.id = ?1");
        let mut audit = self
            .db()
            .query_one(&sql, vec![id.into()], row_to_audit)
            .await?
            .ok_or_else(|| DatabaseError::not_found("audit", id))?;
        audit.services = self.services_for_audit(id).await?;
        Ok(audit)
    }

    /// Validate, then insert or update an audit. Returns its id.
    ///
    /// Services on the audit that are not yet linked are added.
    pub async fn save_audit(&self, audit: &Audit) -> Result<i64, DatabaseError> {
        if let Err(error) = audit.validate() {
            self.write_log(&error.to_string()).await;
            return Err(error.into());
        }
        if audit.client_id == UNSET_ID {
            return Err(DatabaseError::validation("Cannot save audit as no client has been set"));
        }

        let mut params = vec![
            audit.client_id.into(),
            opt_id(audit.client_group_member_id),
            opt_id(audit.application_id),
            opt_id(audit.invoice_id),
            opt_id(audit.lead_auditor_id),
            opt_id(audit.trainee_auditor_id),
            opt_id(audit.audit_type_id),
            opt_id(audit.audit_status_id),
            opt_text(audit.notes.as_deref()),
            opt_text(audit.interviewees.as_deref()),
            opt_text(audit.documents_reviewed.as_deref()),
            opt_date(audit.date_due),
            opt_date(audit.date_planned),
            opt_text(audit.planned_start_time.as_deref()),
            opt_date(audit.date_inspected),
            opt_text(audit.audit_start.as_deref()),
            opt_text(audit.audit_finish.as_deref()),
            opt_real(audit.audit_duration),
            flag(audit.issues_discussed),
            flag(audit.requires_testing),
            opt_real(audit.audit_expenses),
            opt_real(audit.testing_costs),
            opt_text(audit.test_sample_location.as_deref()),
        ];

        let id = if audit.id == UNSET_ID {
            self.db()
                .insert(
                    "INSERT INTO audits (client_id, client_group_member_id, application_id, invoice_id,
                     lead_auditor_id, trainee_auditor_id, list_audit_type_id, list_audit_status_id,
                     notes, interviewees, documents_reviewed, date_due, date_planned,
                     planned_start_time, date_inspected, audit_start, audit_finish, audit_duration,
                     issues_discussed, requires_testing, audit_expenses, testing_costs,
                     test_sample_location)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
                    params,
                )
                .await?
        } else {
            params.push(audit.id.into());
            self.db()
                .execute(
                    "UPDATE audits SET client_id = ?1, client_group_member_id = ?2, application_id = ?3,
                     invoice_id = ?4, lead_auditor_id = ?5, trainee_auditor_id = ?6,
                     list_audit_type_id = ?7, list_audit_status_id = ?8, notes = ?9,
                     interviewees = ?10, documents_reviewed = ?11, date_due = ?12,
                     date_planned = ?13, planned_start_time = ?14, date_inspected = ?15,
                     audit_start = ?16, audit_finish = ?17, audit_duration = ?18,
                     issues_discussed = ?19, requires_testing = ?20, audit_expenses = ?21,
                     testing_costs = ?22, test_sample_location = ?23
                     WHERE id = ?24",
                    params,
                )
                .await?;
            audit.id
        };

        for service in &audit.services {
            if !self.audit_has_service(id, service.service_id).await? {
                self.db()
                    .insert(
                        "INSERT INTO audit_services (audit_id, service_id) VALUES (?1, ?2)",
                        vec![id.into(), service.service_id.into()],
                    )
                    .await?;
            }
        }
        Ok(id)
    }

    pub async fn delete_audit(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute("UPDATE audits SET is_deleted = 1 WHERE id = ?1", vec![id.into()])
            .await?;
        Ok(())
    }

    /// Missing audits count as deleted.
    pub async fn audit_is_deleted(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self
            .db()
            .query_one("SELECT is_deleted FROM audits WHERE id = ?1", vec![id.into()], |row| {
                get_flag(row, 0)
            })
            .await?
            .unwrap_or(true))
    }

    pub async fn audit_status_name(&self, id: i64) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .db()
            .query_one(
                "SELECT status FROM vw_audits WHERE id = ?1",
                vec![id.into()],
                |row| get_opt_string(row, 0),
            )
            .await?
            .flatten())
    }

    /// `"{company} - {type} ({status})"`.
    pub async fn audit_title(&self, id: i64) -> Result<Option<String>, DatabaseError> {
        self.db()
            .query_one(
                "SELECT company, audit_type, status FROM vw_audits WHERE id = ?1",
                vec![id.into()],
                |row| {
                    Ok(format!(
                        "{} - {} ({})",
                        get_opt_string(row, 0)?.unwrap_or_default(),
                        get_opt_string(row, 1)?.unwrap_or_default(),
                        get_opt_string(row, 2)?.unwrap_or_default(),
                    ))
                },
            )
            .await
    }

    /// Live audits of non-test clients matching `criteria`, earliest due first.
    pub async fn list_audits(&self, criteria: &ListCriteria) -> Result<Vec<Audit>, DatabaseError> {
        let (filter, params) = match criteria {
            ListCriteria::Open => (
                "COALESCE(s.name, '') NOT IN (?1, ?2)",
                vec![text(AUDIT_STATUS_FINISHED), text(AUDIT_STATUS_CANCELLED)],
            ),
            ListCriteria::Exact(status) => ("s.name = ?1", vec![text(status)]),
        };
        let sql = format!(
            "{AUDIT_SELECT} WHERE a.is_deleted = 0 AND c.is_deleted = 0 AND c.is_test = 0 AND {filter}
             ORDER BY a.date_due IS NULL, a.date_due, a.id"
        );
        let audits = self.db().query_map(&sql, params, row_to_audit).await?;
        self.with_services(audits).await
    }

    async fn with_services(&self, audits: Vec<Audit>) -> Result<Vec<Audit>, DatabaseError> {
        let mut out = Vec::with_capacity(audits.len());
        for mut audit in audits {
            audit.services = self.services_for_audit(audit.id).await?;
            out.push(audit);
        }
        Ok(out)
    }

    /// Live audits of a client inspected during `year`, newest first.
    pub async fn client_inspected_audits(
        &self,
        client_id: i64,
        year: i32,
    ) -> Result<Vec<Audit>, DatabaseError> {
        let sql = format!(
            "{AUDIT_SELECT} WHERE a.client_id = ?1 AND a.is_deleted = 0
             AND strftime('%Y', a.date_inspected) = ?2
             ORDER BY a.id DESC"
        );
        let audits = self
            .db()
            .query_map(&sql, vec![client_id.into(), text(&format!("{year:04}"))], row_to_audit)
            .await?;
        self.with_services(audits).await
    }

    /// Replace the audit's services with those its client currently holds.
    pub async fn add_default_services(&self, audit: &mut Audit) -> Result<(), DatabaseError> {
        audit.services = self
            .services_for_client(audit.client_id)
            .await?
            .into_iter()
            .map(|held| AuditService {
                id: UNSET_ID,
                audit_id: audit.id,
                service_id: held.service_id,
                service: None,
            })
            .collect();
        Ok(())
    }

    pub async fn audit_date(&self, id: i64, which: AuditDate) -> Result<Option<NaiveDate>, DatabaseError> {
        let sql = format!("SELECT {} FROM audits WHERE id = ?1", which.column());
        Ok(self
            .db()
            .query_one(&sql, vec![id.into()], |row| get_opt_date(row, 0))
            .await?
            .flatten())
    }

    /// Whether one of the audited addresses is the client's operation address.
    pub async fn audit_includes_operation_address(&self, audit_id: i64) -> Result<bool, DatabaseError> {
        self.db()
            .exists(
                "SELECT COUNT(*) FROM audit_addresses aa
                 JOIN client_addresses ca ON ca.id = aa.client_address_id
                 WHERE aa.audit_id = ?1 AND ca.is_operation_address = 1 AND ca.is_deleted = 0",
                vec![audit_id.into()],
            )
            .await
    }

    /// Laboratory results filed against the audit.
    pub async fn count_test_results(&self, audit_id: i64) -> Result<i64, DatabaseError> {
        self.db()
            .count(
                "SELECT COUNT(*) FROM test_results WHERE item_id = ?1 AND is_deleted = 0",
                vec![audit_id.into()],
            )
            .await
    }

    /// Expense claims lodged for the audit.
    pub async fn count_audit_expenses(&self, audit_id: i64) -> Result<i64, DatabaseError> {
        self.db()
            .count(
                "SELECT COUNT(*) FROM audit_expenses WHERE audit_id = ?1 AND is_deleted = 0",
                vec![audit_id.into()],
            )
            .await
    }
}
