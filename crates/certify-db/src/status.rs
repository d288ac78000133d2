//! Dashboard status counts.
//!
//! Each [`StatusType`] is one independent count query. Date windows are
//! computed here and bound as ISO text so the same queries run against a
//! fixed day in tests.

use chrono::{Days, NaiveDate, Utc};
use libsql::Value;

use certify_core::enums::StatusType;
use certify_core::names::{
    AUDIT_STATUS_ALLOCATED, AUDIT_STATUS_CREATED, AUDIT_STATUS_INSPECTED, AUDIT_STATUS_REJECTED,
    SERVICE_STATUS_ACTIVE, TEST_CLIENT_COMPANY, WORKFLOW_APPLICATION_CANCELLED,
    WORKFLOW_APPLICATION_FINISHED, WORKFLOW_READY_FOR_DECISION, WORKFLOW_READY_FOR_INITIAL_REVIEW,
};
use certify_core::status::Status;

use crate::error::DatabaseError;
use crate::helpers::{date, text};
use crate::service::CertifyService;

/// Certificates expiring within this many days raise a warning.
pub const CERTIFICATE_WARNING_DAYS: i64 = 60;

fn offset(today: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        today.checked_add_days(magnitude)
    } else {
        today.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(today)
}

impl CertifyService {
    /// Count for one status as of today.
    pub async fn status(&self, status_type: StatusType) -> Result<Status, DatabaseError> {
        self.status_on(status_type, Utc::now().date_naive()).await
    }

    /// Every status, in dashboard order.
    pub async fn statuses(&self) -> Result<Vec<Status>, DatabaseError> {
        let today = Utc::now().date_naive();
        let mut out = Vec::with_capacity(StatusType::ALL.len());
        for status_type in StatusType::ALL {
            out.push(self.status_on(status_type, today).await?);
        }
        Ok(out)
    }

    /// Statuses with something outstanding.
    pub async fn active_statuses(&self) -> Result<Vec<Status>, DatabaseError> {
        Ok(self
            .statuses()
            .await?
            .into_iter()
            .filter(Status::is_active)
            .collect())
    }

    pub(crate) async fn status_on(
        &self,
        status_type: StatusType,
        today: NaiveDate,
    ) -> Result<Status, DatabaseError> {
        let (sql, params) = self.count_query(status_type, today);
        let count = self.db().count(sql, params).await?;
        tracing::debug!(status = %status_type, count, "dashboard status");
        Ok(Status::from_count(status_type, count))
    }

    fn count_query(&self, status_type: StatusType, today: NaiveDate) -> (&'static str, Vec<Value>) {
        let settings = self.settings();
        match status_type {
            StatusType::NewProduct => (
                "SELECT COUNT(*) FROM certified_items
                 WHERE status = 'Applied' AND certificate_number IS NOT NULL
                 AND certificate_number <> '' AND is_deleted = 0",
                vec![],
            ),
            StatusType::NewIngredient => (
                "SELECT COUNT(*) FROM ingredients WHERE date_time_assessed IS NULL",
                vec![],
            ),
            StatusType::NewRecipe => (
                "SELECT COUNT(*) FROM certified_organic_recipes
                 WHERE approval_date_time IS NULL AND is_deleted = 0",
                vec![],
            ),
            StatusType::NewLabel => (
                "SELECT COUNT(*) FROM labels
                 WHERE status = 'Applied' AND decision_date_time IS NULL AND is_deleted = 0",
                vec![],
            ),
            StatusType::NewApplication => (
                "SELECT COUNT(*) FROM vw_applications
                 WHERE is_deleted = 0 AND work_flow = ?1 AND company IS NULL
                 AND COALESCE(is_test_company, 0) = 0",
                vec![text(WORKFLOW_READY_FOR_INITIAL_REVIEW)],
            ),
            StatusType::StaleApplication => (
                "SELECT COUNT(*) FROM vw_web_application_last_activity
                 WHERE is_deleted = 0 AND is_test_company = 0
                 AND COALESCE(work_flow, '') NOT IN (?1, ?2)
                 AND last_activity < ?3",
                vec![
                    text(WORKFLOW_APPLICATION_FINISHED),
                    text(WORKFLOW_APPLICATION_CANCELLED),
                    date(offset(today, -settings.stale_application_days)),
                ],
            ),
            StatusType::ApplicationReadyForDecision => (
                "SELECT COUNT(*) FROM vw_applications
                 WHERE is_deleted = 0 AND work_flow = ?1 AND company IS NOT NULL
                 AND is_test_company = 0",
                vec![text(WORKFLOW_READY_FOR_DECISION)],
            ),
            StatusType::Derogation => (
                "SELECT COUNT(*) FROM derogations WHERE is_deleted = 0 AND decision IS NULL",
                vec![],
            ),
            StatusType::InspectedAudit => (
                "SELECT COUNT(*) FROM vw_audits
                 WHERE status = ?1 AND company <> ?2 AND is_deleted = 0",
                vec![text(AUDIT_STATUS_INSPECTED), text(TEST_CLIENT_COMPANY)],
            ),
            StatusType::AuditWarning => (
                "SELECT COUNT(*) FROM vw_audits
                 WHERE is_deleted = 0 AND date_planned IS NULL AND date_due <= ?1
                 AND is_test = 0 AND status IN (?2, ?3, ?4)",
                vec![
                    date(offset(today, settings.audit_warning_days)),
                    text(AUDIT_STATUS_CREATED),
                    text(AUDIT_STATUS_ALLOCATED),
                    text(AUDIT_STATUS_REJECTED),
                ],
            ),
            StatusType::RejectedAudit => (
                "SELECT COUNT(*) FROM vw_audits WHERE is_deleted = 0 AND status = ?1",
                vec![text(AUDIT_STATUS_REJECTED)],
            ),
            StatusType::OverdueCar => (
                "SELECT COUNT(*) FROM vw_cars
                 WHERE is_deleted = 0 AND current_status <> 'Closed' AND is_resolved = 0
                 AND due_date IS NOT NULL AND due_date <= ?1 AND company <> ?2",
                vec![date(today), text(TEST_CLIENT_COMPANY)],
            ),
            StatusType::EndingRestriction => (
                "SELECT COUNT(DISTINCT a.id) FROM client_addresses a
                 JOIN client_services cs ON cs.client_id = a.client_id AND cs.is_deleted = 0
                 JOIN service_status ss ON ss.id = cs.service_status_id
                 WHERE a.is_deleted = 0 AND a.restriction_end_date IS NOT NULL
                 AND a.restriction_end_date <= ?1 AND ss.name = ?2",
                vec![date(today), text(SERVICE_STATUS_ACTIVE)],
            ),
            StatusType::OverdueQualityCar => (
                "SELECT COUNT(*) FROM quality_cars WHERE status = 'Overdue' AND is_closed = 0",
                vec![],
            ),
            StatusType::CertificateWarning => (
                "SELECT COUNT(*) FROM client_certificates cc
                 JOIN clients c ON c.id = cc.client_id
                 WHERE cc.is_deleted = 0 AND c.is_deleted = 0 AND c.is_test = 0
                 AND cc.expiry_date IS NOT NULL AND cc.expiry_date <= ?1",
                vec![date(offset(today, CERTIFICATE_WARNING_DAYS))],
            ),
            StatusType::BusinessDevelopmentReminder => (
                "SELECT COUNT(*) FROM business_development
                 WHERE is_deleted = 0 AND reminder_date IS NOT NULL AND reminder_date <= ?1",
                vec![date(today)],
            ),
            StatusType::ClientUpdate => (
                "SELECT COUNT(*) FROM client_updates
                 WHERE processed_date_time IS NULL AND is_deleted = 0",
                vec![],
            ),
        }
    }
}
