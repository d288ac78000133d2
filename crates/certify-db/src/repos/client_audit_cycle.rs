use certify_core::entities::ClientAuditCycle;
use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_id, opt_id};
use crate::service::CertifyService;

fn row_to_cycle(row: &libsql::Row) -> Result<ClientAuditCycle, DatabaseError> {
    Ok(ClientAuditCycle {
        id: row.get::<i64>(0)?,
        client_id: row.get::<i64>(1)?,
        preferred_auditor_user_id: get_opt_id(row, 2)?,
        audit_cycle_frequency: get_opt_id(row, 3)?,
        audit_cycle_month: get_opt_id(row, 4)?,
        audit_cycle_day: get_opt_id(row, 5)?,
    })
}

const CYCLE_COLUMNS: &str = "id, client_id, preferred_auditor_user_id, audit_cycle_frequency,
     audit_cycle_month, audit_cycle_day";

impl CertifyService {
    /// The live audit cycle for a client, if one has been saved.
    pub async fn audit_cycle_for_client(
        &self,
        client_id: i64,
    ) -> Result<Option<ClientAuditCycle>, DatabaseError> {
        let sql = format!(
            "SELECT {CYCLE_COLUMNS} FROM client_audit_cycles
             WHERE client_id = ?1 AND is_deleted = 0
             ORDER BY id LIMIT 1"
        );
        self.db().query_one(&sql, vec![client_id.into()], row_to_cycle).await
    }

    pub async fn fetch_audit_cycle(&self, id: i64) -> Result<ClientAuditCycle, DatabaseError> {
        let sql = format!("SELECT {CYCLE_COLUMNS} FROM client_audit_cycles WHERE id = ?1");
        self.db()
            .query_one(&sql, vec![id.into()], row_to_cycle)
            .await?
            .ok_or_else(|| DatabaseError::not_found("client_audit_cycle", id))
    }

    /// Insert or update an audit cycle. Returns its id.
    pub async fn save_audit_cycle(&self, cycle: &ClientAuditCycle) -> Result<i64, DatabaseError> {
        if cycle.client_id == UNSET_ID {
            return Err(DatabaseError::validation(
                "An audit cycle must belong to a client",
            ));
        }
        let params = vec![
            opt_id(cycle.preferred_auditor_user_id),
            opt_id(cycle.audit_cycle_frequency),
            opt_id(cycle.audit_cycle_month),
            opt_id(cycle.audit_cycle_day),
            cycle.client_id.into(),
        ];

        if cycle.id == UNSET_ID {
            return self
                .db()
                .insert(
                    "INSERT INTO client_audit_cycles
                     (preferred_auditor_user_id, audit_cycle_frequency, audit_cycle_month, audit_cycle_day, client_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params,
                )
                .await;
        }

        let mut params = params;
        params.push(cycle.id.into());
        self.db()
            .execute(
                "UPDATE client_audit_cycles SET preferred_auditor_user_id = ?1, audit_cycle_frequency = ?2,
                 audit_cycle_month = ?3, audit_cycle_day = ?4, client_id = ?5
                 WHERE id = ?6",
                params,
            )
            .await?;
        Ok(cycle.id)
    }
}
