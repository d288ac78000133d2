//! Admin settings repository: the single `admin` row (id = 1).
//!
//! Holds network folder roots, the impersonation switch, and the last-run
//! stamps of the scheduled jobs.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::helpers::{datetime, get_opt_datetime, get_opt_id, get_opt_string, id_param};
use crate::service::CertifyService;

/// A folder setting on the admin row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminFolder {
    CertificationMark,
    Report,
    DocumentTemplate,
    EmailFileRoot,
    MasterFileRoot,
    HumanResourcesRoot,
    WebUpload,
    Ingredients,
    OrganicInputs,
    WebUsers,
}

impl AdminFolder {
    pub const ALL: [Self; 10] = [
        Self::CertificationMark,
        Self::Report,
        Self::DocumentTemplate,
        Self::EmailFileRoot,
        Self::MasterFileRoot,
        Self::HumanResourcesRoot,
        Self::WebUpload,
        Self::Ingredients,
        Self::OrganicInputs,
        Self::WebUsers,
    ];

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CertificationMark => "certification_mark_folder",
            Self::Report => "report_folder",
            Self::DocumentTemplate => "document_template_folder",
            Self::EmailFileRoot => "email_file_root_folder",
            Self::MasterFileRoot => "master_file_root_folder",
            Self::HumanResourcesRoot => "human_resources_root_folder",
            Self::WebUpload => "web_upload_folder",
            Self::Ingredients => "ingredients_folder",
            Self::OrganicInputs => "organic_inputs_folder",
            Self::WebUsers => "web_users_folder",
        }
    }

    /// HR files live on a share that is never remapped.
    #[must_use]
    pub const fn rewrites_path(self) -> bool {
        !matches!(self, Self::HumanResourcesRoot)
    }
}

/// A scheduled job whose last run is stamped on the admin row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminJob {
    MonthlyReports,
    AuditScheduling,
}

impl AdminJob {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::MonthlyReports => "monthly_reports_last_run",
            Self::AuditScheduling => "audit_scheduling_last_run",
        }
    }
}

impl CertifyService {
    /// Raw folder value from the admin row. Empty reads as `None`.
    pub async fn admin_value(&self, folder: AdminFolder) -> Result<Option<String>, DatabaseError> {
        let sql = format!("SELECT {} FROM admin WHERE id = 1", folder.column());
        Ok(self
            .db()
            .query_one(&sql, vec![], |row| get_opt_string(row, 0))
            .await?
            .flatten())
    }

    /// Folder path ready for use on this machine.
    pub async fn admin_folder(&self, folder: AdminFolder) -> Result<Option<String>, DatabaseError> {
        let value = self.admin_value(folder).await?;
        Ok(value.map(|path| {
            if folder.rewrites_path() {
                self.settings().paths.safe_path(&path, false)
            } else {
                path
            }
        }))
    }

    /// Every folder setting, rewritten for this machine.
    pub async fn admin_folders(&self) -> Result<Vec<(AdminFolder, Option<String>)>, DatabaseError> {
        let mut folders = Vec::with_capacity(AdminFolder::ALL.len());
        for folder in AdminFolder::ALL {
            folders.push((folder, self.admin_folder(folder).await?));
        }
        Ok(folders)
    }

    pub async fn set_admin_folder(&self, folder: AdminFolder, path: &str) -> Result<(), DatabaseError> {
        let sql = format!("UPDATE admin SET {} = ?1 WHERE id = 1", folder.column());
        self.db().execute(&sql, vec![path.into()]).await?;
        Ok(())
    }

    /// Act as another user in the desktop client.
    pub async fn set_impersonate_id(&self, user_id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "UPDATE admin SET impersonate_user_id = ?1 WHERE id = 1",
                vec![id_param(user_id)],
            )
            .await?;
        Ok(())
    }

    pub async fn clear_impersonate_id(&self) -> Result<(), DatabaseError> {
        self.db()
            .execute("UPDATE admin SET impersonate_user_id = NULL WHERE id = 1", vec![])
            .await?;
        Ok(())
    }

    pub async fn impersonated_user_id(&self) -> Result<Option<i64>, DatabaseError> {
        Ok(self
            .db()
            .query_one(
                "SELECT impersonate_user_id FROM admin WHERE id = 1",
                vec![],
                |row| get_opt_id(row, 0),
            )
            .await?
            .flatten())
    }

    pub async fn job_last_run(&self, job: AdminJob) -> Result<Option<NaiveDateTime>, DatabaseError> {
        let sql = format!("SELECT {} FROM admin WHERE id = 1", job.column());
        Ok(self
            .db()
            .query_one(&sql, vec![], |row| get_opt_datetime(row, 0))
            .await?
            .flatten())
    }

    pub async fn update_job_last_run(&self, job: AdminJob, at: NaiveDateTime) -> Result<(), DatabaseError> {
        let sql = format!("UPDATE admin SET {} = ?1 WHERE id = 1", job.column());
        self.db().execute(&sql, vec![datetime(at)]).await?;
        Ok(())
    }
}
