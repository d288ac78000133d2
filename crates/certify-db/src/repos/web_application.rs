//! Web application repository: lists, fetch, lifecycle and workflow history.
//!
//! Workflow changes are appended to `web_application_history`; the
//! reviewer and decision rules read that history.

use chrono::NaiveDateTime;

use certify_core::entities::WebApplication;
use certify_core::enums::ListCriteria;
use certify_core::ids::UNSET_ID;
use certify_core::names::{
    CAR_SEVERITY_MAJOR, CAR_SOURCE_DOCUMENT_REVIEW, WORKFLOW_APPLICATION_CANCELLED,
    WORKFLOW_APPLICATION_FINISHED, WORKFLOW_DOC_REVIEW_UNDERWAY,
};

use crate::error::DatabaseError;
use crate::helpers::{
    flag, get_flag, get_opt_date, get_opt_datetime, get_opt_id, get_opt_string, opt_date,
    opt_datetime, opt_id, opt_text, text,
};
use crate::repos::lookup::LookupList;
use crate::service::CertifyService;

const APPLICATION_SELECT: &str = "SELECT w.id, w.client_id, c.company, w.user_name, w.work_flow, w.applicant_name,
     w.applicant_email, w.applicant_phone, w.declaration_date_time, w.option_string, w.notes,
     w.result, w.application_type, w.requires_tests, w.expedite, w.is_plan,
     w.application_fee_exempt, w.check_date, w.is_deleted
     FROM web_applications w
     LEFT JOIN clients c ON c.id = w.client_id";

fn row_to_application(row: &libsql::Row) -> Result<WebApplication, DatabaseError> {
    Ok(WebApplication {
        id: row.get::<i64>(0)?,
        client_id: get_opt_id(row, 1)?,
        company: get_opt_string(row, 2)?,
        user_name: get_opt_string(row, 3)?,
        work_flow: get_opt_string(row, 4)?,
        applicant_name: get_opt_string(row, 5)?,
        applicant_email: get_opt_string(row, 6)?,
        applicant_phone: get_opt_string(row, 7)?,
        declaration_date_time: get_opt_datetime(row, 8)?,
        option_string: get_opt_string(row, 9)?,
        notes: get_opt_string(row, 10)?,
        result: get_opt_string(row, 11)?,
        application_type: get_opt_string(row, 12)?,
        requires_tests: get_flag(row, 13)?,
        expedite: get_flag(row, 14)?,
        is_plan: get_flag(row, 15)?,
        application_fee_exempt: get_flag(row, 16)?,
        check_date: get_opt_date(row, 17)?,
        is_deleted: get_flag(row, 18)?,
        ..WebApplication::default()
    })
}

impl CertifyService {
    /// Load an application and resolve the services and categories it names.
    pub async fn fetch_application(&self, id: i64) -> Result<WebApplication, DatabaseError> {
        let sql = format!("{APPLICATION_SELECT} WHERE w.id = ?1");
        let mut application = self
            .db()
            .query_one(&sql, vec![id.into()], row_to_application)
            .await?
            .ok_or_else(|| DatabaseError::not_found("web_application", id))?;
        self.resolve_options(&mut application).await?;
        Ok(application)
    }

    /// A submitted application, i.e. one whose option string is filled in.
    pub async fn submitted_application(&self, id: i64) -> Result<Option<WebApplication>, DatabaseError> {
        match self.fetch_application(id).await {
            Ok(application) if application.option_string.is_some() => Ok(Some(application)),
            Ok(_) => Ok(None),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn resolve_options(&self, application: &mut WebApplication) -> Result<(), DatabaseError> {
        let options = application.selected_options();
        application.service_ids.clear();
        for name in &options.standards {
            match self.service_id(name).await? {
                Some(id) => application.service_ids.push(id),
                None => tracing::debug!(application = application.id, service = %name, "unknown service in option string"),
            }
        }
        application.client_category_ids.clear();
        for name in &options.categories {
            match self.lookup_id(LookupList::ClientCategory, name).await? {
                Some(id) => application.client_category_ids.push(id),
                None => tracing::debug!(application = application.id, category = %name, "unknown category in option string"),
            }
        }
        Ok(())
    }

    /// Live applications of non-test companies matching `criteria`.
    pub async fn list_applications(
        &self,
        criteria: &ListCriteria,
    ) -> Result<Vec<WebApplication>, DatabaseError> {
        let (filter, params) = match criteria {
            ListCriteria::Open => (
                "COALESCE(work_flow, '') NOT IN (?1, ?2)",
                vec![
                    text(WORKFLOW_APPLICATION_FINISHED),
                    text(WORKFLOW_APPLICATION_CANCELLED),
                ],
            ),
            ListCriteria::Exact(workflow) => ("work_flow = ?1", vec![text(workflow)]),
        };
        let sql = format!(
            "SELECT id FROM vw_applications
             WHERE COALESCE(is_test_company, 0) = 0 AND is_deleted = 0 AND {filter}
             ORDER BY id"
        );
        let ids = self
            .db()
            .query_map(&sql, params, |row| Ok(row.get::<i64>(0)?))
            .await?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.fetch_application(id).await?);
        }
        Ok(out)
    }

    /// Insert or update an application. Returns its id.
    pub async fn save_application(&self, application: &WebApplication) -> Result<i64, DatabaseError> {
        let mut params = vec![
            opt_id(application.client_id),
            opt_text(application.user_name.as_deref()),
            opt_text(application.work_flow.as_deref()),
            opt_text(application.applicant_name.as_deref()),
            opt_text(application.applicant_email.as_deref()),
            opt_text(application.applicant_phone.as_deref()),
            opt_datetime(application.declaration_date_time),
            opt_text(application.option_string.as_deref()),
            opt_text(application.notes.as_deref()),
            opt_text(application.result.as_deref()),
            opt_text(application.application_type.as_deref()),
            flag(application.requires_tests),
            flag(application.expedite),
            flag(application.is_plan),
            flag(application.application_fee_exempt),
            opt_date(application.check_date),
        ];
        if application.id == UNSET_ID {
            return self
                .db()
                .insert(
                    "INSERT INTO web_applications (client_id, user_name, work_flow, applicant_name,
                     applicant_email, applicant_phone, declaration_date_time, option_string, notes,
                     result, application_type, requires_tests, expedite, is_plan,
                     application_fee_exempt, check_date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                    params,
                )
                .await;
        }
        params.push(application.id.into());
        self.db()
            .execute(
                "UPDATE web_applications SET client_id = ?1, user_name = ?2, work_flow = ?3,
                 applicant_name = ?4, applicant_email = ?5, applicant_phone = ?6,
                 declaration_date_time = ?7, option_string = ?8, notes = ?9, result = ?10,
                 application_type = ?11, requires_tests = ?12, expedite = ?13, is_plan = ?14,
                 application_fee_exempt = ?15, check_date = ?16
                 WHERE id = ?17",
                params,
            )
            .await?;
        Ok(application.id)
    }

    /// Id of the most recent audit raised from this application.
    pub async fn linked_audit_id(&self, application_id: i64) -> Result<Option<i64>, DatabaseError> {
        self.db()
            .query_one(
                "SELECT id FROM audits WHERE application_id = ?1 ORDER BY id DESC LIMIT 1",
                vec![application_id.into()],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await
    }

    /// Major document-review CARs raised against the application that are still open.
    pub async fn count_open_cars(&self, application_id: i64) -> Result<i64, DatabaseError> {
        self.db()
            .count(
                "SELECT COUNT(*) FROM vw_cars
                 WHERE current_status NOT IN ('Closed', 'Cancelled')
                 AND severity = ?1 AND source = ?2 AND item_id = ?3 AND is_deleted = 0",
                vec![
                    text(CAR_SEVERITY_MAJOR),
                    text(CAR_SOURCE_DOCUMENT_REVIEW),
                    application_id.into(),
                ],
            )
            .await
    }

    /// Returns `true` when a row was changed.
    pub async fn delete_application(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self
            .db()
            .execute(
                "UPDATE web_applications SET is_deleted = 1 WHERE id = ?1",
                vec![id.into()],
            )
            .await?
            == 1)
    }

    pub async fn undelete_application(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self
            .db()
            .execute(
                "UPDATE web_applications SET is_deleted = 0 WHERE id = ?1",
                vec![id.into()],
            )
            .await?
            == 1)
    }

    pub async fn application_is_deleted(&self, id: i64) -> Result<bool, DatabaseError> {
        self.db()
            .exists(
                "SELECT COUNT(*) FROM web_applications WHERE id = ?1 AND is_deleted = 1",
                vec![id.into()],
            )
            .await
    }

    /// Remove the application along with its history and responses.
    /// Audits raised from it stay and lose the link.
    pub async fn delete_application_permanently(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self
            .db()
            .execute("DELETE FROM web_applications WHERE id = ?1", vec![id.into()])
            .await?
            == 1)
    }

    /// Move an application to `workflow` and record who did it.
    pub async fn record_workflow(
        &self,
        application_id: i64,
        workflow: &str,
        user_id: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let changed = self
            .db()
            .execute(
                "UPDATE web_applications SET work_flow = ?1 WHERE id = ?2",
                vec![text(workflow), application_id.into()],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("web_application", application_id));
        }
        self.db()
            .insert(
                "INSERT INTO web_application_history (web_application_id, work_flow, user_id)
                 VALUES (?1, ?2, ?3)",
                vec![application_id.into(), text(workflow), opt_id(user_id)],
            )
            .await
    }

    /// When the application first entered `workflow`.
    pub async fn workflow_date(
        &self,
        application_id: i64,
        workflow: &str,
    ) -> Result<Option<NaiveDateTime>, DatabaseError> {
        Ok(self
            .db()
            .query_one(
                "SELECT created_at FROM web_application_history
                 WHERE web_application_id = ?1 AND work_flow = ?2 AND is_deleted = 0
                 ORDER BY id LIMIT 1",
                vec![application_id.into(), text(workflow)],
                |row| get_opt_datetime(row, 0),
            )
            .await?
            .flatten())
    }

    /// Only users with no part in the application's history may decide it.
    pub async fn can_make_decision(&self, application_id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        Ok(!self
            .db()
            .exists(
                "SELECT COUNT(*) FROM web_application_history
                 WHERE web_application_id = ?1 AND user_id = ?2",
                vec![application_id.into(), user_id.into()],
            )
            .await?)
    }

    /// The user who started document review, when exactly one did.
    pub async fn document_reviewer(&self, application_id: i64) -> Result<Option<i64>, DatabaseError> {
        let reviewers = self
            .db()
            .query_map(
                "SELECT user_id FROM web_application_history
                 WHERE web_application_id = ?1 AND work_flow = ?2",
                vec![application_id.into(), text(WORKFLOW_DOC_REVIEW_UNDERWAY)],
                |row| get_opt_id(row, 0),
            )
            .await?;
        Ok(match reviewers.as_slice() {
            [reviewer] => *reviewer,
            _ => None,
        })
    }

    /// Audits on a reviewed application are processed by its document reviewer.
    pub async fn can_process_audit(&self, application_id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        Ok(self
            .document_reviewer(application_id)
            .await?
            .is_none_or(|reviewer| reviewer == user_id))
    }
}
