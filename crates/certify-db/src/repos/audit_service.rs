use certify_core::entities::AuditService;
use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;
use crate::helpers::get_opt_string;
use crate::service::CertifyService;

const AUDIT_SERVICE_SELECT: &str = "SELECT aus.id, aus.audit_id, aus.service_id, s.name
     FROM audit_services aus
     LEFT JOIN services s ON s.id = aus.service_id";

fn row_to_audit_service(row: &libsql::Row) -> Result<AuditService, DatabaseError> {
    Ok(AuditService {
        id: row.get::<i64>(0)?,
        audit_id: row.get::<i64>(1)?,
        service_id: row.get::<i64>(2)?,
        service: get_opt_string(row, 3)?,
    })
}

impl CertifyService {
    pub async fn services_for_audit(&self, audit_id: i64) -> Result<Vec<AuditService>, DatabaseError> {
        let sql = format!("{AUDIT_SERVICE_SELECT} WHERE aus.audit_id = ?1 ORDER BY aus.id");
        self.db()
            .query_map(&sql, vec![audit_id.into()], row_to_audit_service)
            .await
    }

    pub async fn fetch_audit_service(&self, id: i64) -> Result<AuditService, DatabaseError> {
        let sql = format!("{AUDIT_SERVICE_SELECT} WHERE aus.id = ?1");
        self.db()
            .query_one(&sql, vec![id.into()], row_to_audit_service)
            .await?
            .ok_or_else(|| DatabaseError::not_found("audit_service", id))
    }

    pub async fn find_audit_service(
        &self,
        audit_id: i64,
        service_id: i64,
    ) -> Result<Option<AuditService>, DatabaseError> {
        let sql = format!(
            "{AUDIT_SERVICE_SELECT} WHERE aus.audit_id = ?1 AND aus.service_id = ?2 ORDER BY aus.id LIMIT 1"
        );
        self.db()
            .query_one(&sql, vec![audit_id.into(), service_id.into()], row_to_audit_service)
            .await
    }

    pub async fn audit_has_service(&self, audit_id: i64, service_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.find_audit_service(audit_id, service_id).await?.is_some())
    }

    /// Insert or update the link. Returns its id.
    pub async fn save_audit_service(&self, audit_service: &AuditService) -> Result<i64, DatabaseError> {
        if audit_service.audit_id == UNSET_ID || audit_service.service_id == UNSET_ID {
            return Err(DatabaseError::validation(
                "An audit service needs both an audit and a service",
            ));
        }
        if audit_service.id == UNSET_ID {
            return self
                .db()
                .insert(
                    "INSERT INTO audit_services (audit_id, service_id) VALUES (?1, ?2)",
                    vec![audit_service.audit_id.into(), audit_service.service_id.into()],
                )
                .await;
        }
        self.db()
            .execute(
                "UPDATE audit_services SET audit_id = ?1, service_id = ?2 WHERE id = ?3",
                vec![
                    audit_service.audit_id.into(),
                    audit_service.service_id.into(),
                    audit_service.id.into(),
                ],
            )
            .await?;
        Ok(audit_service.id)
    }

    pub async fn delete_audit_service(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute("DELETE FROM audit_services WHERE id = ?1", vec![id.into()])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_client, test_service};
    use certify_core::entities::Service;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn link_find_and_remove() {
        let (svc, _dir) = test_service().await;
        let client_id = seed_client(&svc, "Link Co").await;
        let audit_id = svc
            .db()
            .insert("INSERT INTO audits (client_id) VALUES (?1)", vec![client_id.into()])
            .await
            .unwrap();
        let service_id = svc.save_service(&Service::new("Biodynamic")).await.unwrap();

        let id = svc
            .save_audit_service(&AuditService {
                id: UNSET_ID,
                audit_id,
                service_id,
                service: None,
            })
            .await
            .unwrap();
        assert!(svc.audit_has_service(audit_id, service_id).await.unwrap());
        assert_eq!(
            svc.fetch_audit_service(id).await.unwrap().service.as_deref(),
            Some("Biodynamic")
        );

        svc.delete_audit_service(id).await.unwrap();
        assert!(!svc.audit_has_service(audit_id, service_id).await.unwrap());
        assert!(svc.fetch_audit_service(id).await.unwrap_err().is_not_found());
    }
}
