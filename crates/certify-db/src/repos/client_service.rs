//! Services held by a client, and the status history of each.

use chrono::NaiveDateTime;

use certify_core::entities::{ClientService, ClientServiceHistory, active_during_period};
use certify_core::ids::UNSET_ID;
use certify_core::names::SERVICE_STATUS_ACTIVE;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_id, get_opt_string, opt_id, text};
use crate::service::CertifyService;

const CLIENT_SERVICE_SELECT: &str = "SELECT cs.id, cs.client_id, cs.service_id, cs.service_status_id, ss.name
     FROM client_services cs
     LEFT JOIN service_status ss ON ss.id = cs.service_status_id";

fn row_to_client_service(row: &libsql::Row) -> Result<ClientService, DatabaseError> {
    Ok(ClientService {
        id: row.get::<i64>(0)?,
        client_id: row.get::<i64>(1)?,
        service_id: row.get::<i64>(2)?,
        service_status_id: get_opt_id(row, 3)?,
        status: get_opt_string(row, 4)?,
    })
}

fn row_to_history(row: &libsql::Row) -> Result<ClientServiceHistory, DatabaseError> {
    Ok(ClientServiceHistory {
        id: row.get::<i64>(0)?,
        client_service_id: row.get::<i64>(1)?,
        status: get_opt_string(row, 2)?,
        user_id: get_opt_id(row, 3)?,
        created_at: get_opt_datetime(row, 4)?,
    })
}

impl CertifyService {
    pub async fn services_for_client(&self, client_id: i64) -> Result<Vec<ClientService>, DatabaseError> {
        let sql = format!(
            "{CLIENT_SERVICE_SELECT} WHERE cs.client_id = ?1 AND cs.is_deleted = 0 ORDER BY cs.id"
        );
        self.db()
            .query_map(&sql, vec![client_id.into()], row_to_client_service)
            .await
    }

    pub async fn fetch_client_service(&self, id: i64) -> Result<ClientService, DatabaseError> {
        let sql = format!("{CLIENT_SERVICE_SELECT} WHERE cs.id = ?1");
        self.db()
            .query_one(&sql, vec![id.into()], row_to_client_service)
            .await?
            .ok_or_else(|| DatabaseError::not_found("client_service", id))
    }

    /// The live link between a client and a service, if any.
    pub async fn find_client_service(
        &self,
        client_id: i64,
        service_id: i64,
    ) -> Result<Option<ClientService>, DatabaseError> {
        let sql = format!(
            "{CLIENT_SERVICE_SELECT}
             WHERE cs.client_id = ?1 AND cs.service_id = ?2 AND cs.is_deleted = 0
             ORDER BY cs.id LIMIT 1"
        );
        self.db()
            .query_one(&sql, vec![client_id.into(), service_id.into()], row_to_client_service)
            .await
    }

    /// Insert or update a client service. Returns its id.
    ///
    /// Inserting a service the client already holds returns the existing id.
    /// A status change writes a history row attributed to `user_id`.
    pub async fn save_client_service(
        &self,
        client_service: &ClientService,
        user_id: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        if client_service.client_id == UNSET_ID || client_service.service_id == UNSET_ID {
            return Err(DatabaseError::validation(
                "A client service needs both a client and a service",
            ));
        }

        if client_service.id == UNSET_ID {
            if let Some(existing) = self
                .find_client_service(client_service.client_id, client_service.service_id)
                .await?
            {
                tracing::debug!(
                    client_id = client_service.client_id,
                    service_id = client_service.service_id,
                    "client already holds service"
                );
                return Ok(existing.id);
            }
            let id = self
                .db()
                .insert(
                    "INSERT INTO client_services (client_id, service_id, service_status_id)
                     VALUES (?1, ?2, ?3)",
                    vec![
                        client_service.client_id.into(),
                        client_service.service_id.into(),
                        opt_id(client_service.service_status_id),
                    ],
                )
                .await?;
            if client_service.service_status_id.is_some() {
                self.record_service_status(id, client_service.service_status_id, user_id)
                    .await?;
            }
            return Ok(id);
        }

        let previous = self.fetch_client_service(client_service.id).await?;
        self.db()
            .execute(
                "UPDATE client_services SET service_status_id = ?1 WHERE id = ?2",
                vec![opt_id(client_service.service_status_id), client_service.id.into()],
            )
            .await?;
        if previous.service_status_id != client_service.service_status_id {
            self.record_service_status(client_service.id, client_service.service_status_id, user_id)
                .await?;
        }
        Ok(client_service.id)
    }

    async fn record_service_status(
        &self,
        client_service_id: i64,
        service_status_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        self.db()
            .insert(
                "INSERT INTO client_service_history (client_service_id, service_status_id, user_id)
                 VALUES (?1, ?2, ?3)",
                vec![client_service_id.into(), opt_id(service_status_id), opt_id(user_id)],
            )
            .await
    }

    pub async fn delete_client_service(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "UPDATE client_services SET is_deleted = 1 WHERE id = ?1",
                vec![id.into()],
            )
            .await?;
        Ok(())
    }

    /// Remove the row and its history outright.
    pub async fn delete_client_service_permanently(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute("DELETE FROM client_services WHERE id = ?1", vec![id.into()])
            .await?;
        Ok(())
    }

    /// Status changes for a client service, oldest first.
    pub async fn client_service_history(
        &self,
        client_service_id: i64,
    ) -> Result<Vec<ClientServiceHistory>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT h.id, h.client_service_id, ss.name, h.user_id, h.created_at
                 FROM client_service_history h
                 LEFT JOIN service_status ss ON ss.id = h.service_status_id
                 WHERE h.client_service_id = ?1
                 ORDER BY h.id",
                vec![client_service_id.into()],
                row_to_history,
            )
            .await
    }

    /// Whether the client service was certified at any point in the period.
    pub async fn service_active_during_period(
        &self,
        client_service_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<bool, DatabaseError> {
        let history = self.client_service_history(client_service_id).await?;
        Ok(active_during_period(&history, start, end))
    }

    /// When the client first had any service made active.
    pub async fn earliest_certification_date(
        &self,
        client_id: i64,
    ) -> Result<Option<NaiveDateTime>, DatabaseError> {
        Ok(self
            .db()
            .query_one(
                "SELECT MIN(h.created_at)
                 FROM client_service_history h
                 JOIN client_services cs ON cs.id = h.client_service_id
                 JOIN service_status ss ON ss.id = h.service_status_id
                 WHERE cs.client_id = ?1 AND ss.name = ?2",
                vec![client_id.into(), text(SERVICE_STATUS_ACTIVE)],
                |row| get_opt_datetime(row, 0),
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
    use certify_core::entities::Service;
    use pretty_assertions::assert_eq;

    async fn setup(svc: &CertifyService) -> (i64, i64) {
        let client_id = seed_client(svc, "Service Holder").await;
        let service_id = svc.save_service(&Service::new("Organic")).await.unwrap();
        (client_id, service_id)
    }

    #[tokio::test]
    async fn second_insert_returns_existing_id() {
        let (svc, _dir) = test_service().await;
        let (client_id, service_id) = setup(&svc).await;
        let link = ClientService {
            client_id,
            service_id,
            ..ClientService::default()
        };
        let first = svc.save_client_service(&link, None).await.unwrap();
        let second = svc.save_client_service(&link, None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(svc.services_for_client(client_id).await.unwrap().len(), 1);
        assert!(svc.client_has_service(client_id, service_id).await.unwrap());
    }

    #[tokio::test]
    async fn status_changes_are_recorded() {
        let (svc, _dir) = test_service().await;
        let (client_id, service_id) = setup(&svc).await;
        let applied = svc.ensure_lookup(LookupList::ServiceStatus, "Applied").await.unwrap();
        let active = svc.ensure_lookup(LookupList::ServiceStatus, "Active").await.unwrap();

        let mut link = ClientService {
            client_id,
            service_id,
            service_status_id: Some(applied),
            ..ClientService::default()
        };
        link.id = svc.save_client_service(&link, None).await.unwrap();

        svc.save_client_service(&link, None).await.unwrap();
        link.service_status_id = Some(active);
        svc.save_client_service(&link, None).await.unwrap();

        let history = svc.client_service_history(link.id).await.unwrap();
        let statuses: Vec<_> = history.iter().map(|h| h.status.as_deref()).collect();
        assert_eq!(statuses, vec![Some("Applied"), Some("Active")]);
        assert_eq!(
            svc.fetch_client_service(link.id).await.unwrap().status.as_deref(),
            Some("Active")
        );
    }

    #[tokio::test]
    async fn soft_and_permanent_delete() {
        let (svc, _dir) = test_service().await;
        let (client_id, service_id) = setup(&svc).await;
        let link = ClientService {
            client_id,
            service_id,
            ..ClientService::default()
        };
        let id = svc.save_client_service(&link, None).await.unwrap();

        svc.delete_client_service(id).await.unwrap();
        assert!(svc.find_client_service(client_id, service_id).await.unwrap().is_none());
        assert!(svc.fetch_client_service(id).await.is_ok());

        svc.delete_client_service_permanently(id).await.unwrap();
        assert!(svc.fetch_client_service(id).await.unwrap_err().is_not_found());
    }

    async fn history_at(svc: &CertifyService, client_service_id: i64, status_id: i64, at: &str) {
        svc.db()
            .insert(
                "INSERT INTO client_service_history (client_service_id, service_status_id, created_at)
                 VALUES (?1, ?2, ?3)",
                vec![client_service_id.into(), status_id.into(), at.into()],
            )
            .await
            .unwrap();
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[tokio::test]
    async fn activity_and_first_certification_come_from_history() {
        let (svc, _dir) = test_service().await;
        let (client_id, service_id) = setup(&svc).await;
        let active = svc.ensure_lookup(LookupList::ServiceStatus, "Active").await.unwrap();
        let suspended = svc.ensure_lookup(LookupList::ServiceStatus, "Suspended").await.unwrap();
        let id = svc
            .save_client_service(
                &ClientService {
                    client_id,
                    service_id,
                    ..ClientService::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(svc.earliest_certification_date(client_id).await.unwrap(), None);

        history_at(&svc, id, active, "2024-03-01 10:00:00").await;
        history_at(&svc, id, suspended, "2024-09-15 10:00:00").await;
        history_at(&svc, id, active, "2025-02-01 10:00:00").await;

        assert_eq!(
            svc.earliest_certification_date(client_id).await.unwrap(),
            Some(at("2024-03-01 10:00:00"))
        );
        assert!(svc
            .service_active_during_period(id, at("2024-07-01 00:00:00"), at("2024-12-31 23:59:59"))
            .await
            .unwrap());
        assert!(!svc
            .service_active_during_period(id, at("2024-10-01 00:00:00"), at("2025-01-31 23:59:59"))
            .await
            .unwrap());
        assert!(svc
            .service_active_during_period(id, at("2025-06-01 00:00:00"), at("2025-06-30 23:59:59"))
            .await
            .unwrap());
    }
}
