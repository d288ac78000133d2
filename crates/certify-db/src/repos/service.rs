//! Service (certification scheme) repository.

use certify_core::entities::{Service, ServiceStat};
use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;
use crate::helpers::{flag, get_flag, get_opt_date, get_opt_real, get_opt_string, get_string, opt_real, opt_text, text};
use crate::service::CertifyService;

const SERVICE_COLUMNS: &str = "id, name, title, abbreviation, reference, application_fee,
     application_fee_xero_code, certification_fee, certification_fee_xero_code, active";

fn row_to_service(row: &libsql::Row) -> Result<Service, DatabaseError> {
    Ok(Service {
        id: row.get::<i64>(0)?,
        name: get_string(row, 1)?,
        title: get_opt_string(row, 2)?,
        abbreviation: get_opt_string(row, 3)?,
        reference: get_opt_string(row, 4)?,
        application_fee: get_opt_real(row, 5)?,
        application_fee_xero_code: get_opt_string(row, 6)?,
        certification_fee: get_opt_real(row, 7)?,
        certification_fee_xero_code: get_opt_string(row, 8)?,
        active: get_flag(row, 9)?,
    })
}

impl CertifyService {
    pub async fn active_service_names(&self) -> Result<Vec<String>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT name FROM services WHERE active = 1 ORDER BY name",
                vec![],
                |row| get_string(row, 0),
            )
            .await
    }

    pub async fn fetch_service(&self, id: i64) -> Result<Service, DatabaseError> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1");
        self.db()
            .query_one(&sql, vec![id.into()], row_to_service)
            .await?
            .ok_or_else(|| DatabaseError::not_found("service", id))
    }

    pub async fn service_id(&self, name: &str) -> Result<Option<i64>, DatabaseError> {
        self.db()
            .query_one(
                "SELECT id FROM services WHERE name = ?1",
                vec![text(name.trim())],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await
    }

    pub async fn service_name(&self, id: i64) -> Result<Option<String>, DatabaseError> {
        self.db()
            .query_one("SELECT name FROM services WHERE id = ?1", vec![id.into()], |row| {
                get_string(row, 0)
            })
            .await
    }

    pub async fn service_abbreviation(&self, id: i64) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .db()
            .query_one(
                "SELECT abbreviation FROM services WHERE id = ?1",
                vec![id.into()],
                |row| get_opt_string(row, 0),
            )
            .await?
            .flatten())
    }

    /// Insert or update a service. Returns its id.
    pub async fn save_service(&self, service: &Service) -> Result<i64, DatabaseError> {
        if service.name.trim().is_empty() {
            return Err(DatabaseError::validation("Service name cannot be empty"));
        }
        let mut params = vec![
            text(service.name.trim()),
            opt_text(service.title.as_deref()),
            opt_text(service.abbreviation.as_deref()),
            opt_text(service.reference.as_deref()),
            opt_real(service.application_fee),
            opt_text(service.application_fee_xero_code.as_deref()),
            opt_real(service.certification_fee),
            opt_text(service.certification_fee_xero_code.as_deref()),
            flag(service.active),
        ];
        if service.id == UNSET_ID {
            return self
                .db()
                .insert(
                    "INSERT INTO services (name, title, abbreviation, reference, application_fee,
                     application_fee_xero_code, certification_fee, certification_fee_xero_code, active)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params,
                )
                .await;
        }
        params.push(service.id.into());
        self.db()
            .execute(
                "UPDATE services SET name = ?1, title = ?2, abbreviation = ?3, reference = ?4,
                 application_fee = ?5, application_fee_xero_code = ?6, certification_fee = ?7,
                 certification_fee_xero_code = ?8, active = ?9
                 WHERE id = ?10",
                params,
            )
            .await?;
        Ok(service.id)
    }

    /// Audit counts per live client and service, with the first inspection date.
    pub async fn service_stats(&self) -> Result<Vec<ServiceStat>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT c.company, s.name, COUNT(a.id), MIN(a.date_inspected)
                 FROM audit_services aus
                 JOIN audits a ON a.id = aus.audit_id AND a.is_deleted = 0
                 JOIN clients c ON c.id = a.client_id AND c.is_deleted = 0 AND c.is_test = 0
                 JOIN services s ON s.id = aus.service_id
                 GROUP BY c.id, s.id
                 ORDER BY c.company, s.name",
                vec![],
                |row| {
                    Ok(ServiceStat {
                        client: get_string(row, 0)?,
                        service: get_string(row, 1)?,
                        count: row.get::<i64>(2)?,
                        initial_audit_date: get_opt_date(row, 3)?,
                    })
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_client, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn save_and_lookup() {
        let (svc, _dir) = test_service().await;
        let id = svc
            .save_service(&Service {
                abbreviation: Some("ACO".into()),
                application_fee: Some(250.0),
                ..Service::new("Australian Certified Organic")
            })
            .await
            .unwrap();

        let service = svc.fetch_service(id).await.unwrap();
        assert_eq!(service.application_fee, Some(250.0));
        assert!(service.active);
        assert_eq!(svc.service_id("Australian Certified Organic").await.unwrap(), Some(id));
        assert_eq!(svc.service_abbreviation(id).await.unwrap().as_deref(), Some("ACO"));
        assert_eq!(svc.service_name(999).await.unwrap(), None);
        assert!(svc.fetch_service(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn inactive_services_are_not_listed() {
        let (svc, _dir) = test_service().await;
        svc.save_service(&Service::new("NASAA")).await.unwrap();
        svc.save_service(&Service::new("COR")).await.unwrap();
        svc.save_service(&Service {
            active: false,
            ..Service::new("Retired")
        })
        .await
        .unwrap();
        assert_eq!(svc.active_service_names().await.unwrap(), vec!["COR", "NASAA"]);
    }

    #[tokio::test]
    async fn stats_count_audits_per_client_service() {
        let (svc, _dir) = test_service().await;
        let client_id = seed_client(&svc, "Stats Farm").await;
        let service_id = svc.save_service(&Service::new("Organic")).await.unwrap();
        for inspected in ["2024-03-01", "2023-02-01"] {
            let audit_id = svc
                .db()
                .insert(
                    "INSERT INTO audits (client_id, date_inspected) VALUES (?1, ?2)",
                    vec![client_id.into(), inspected.into()],
                )
                .await
                .unwrap();
            svc.db()
                .insert(
                    "INSERT INTO audit_services (audit_id, service_id) VALUES (?1, ?2)",
                    vec![audit_id.into(), service_id.into()],
                )
                .await
                .unwrap();
        }

        let stats = svc.service_stats().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 2);
        assert_eq!(
            stats[0].initial_audit_date,
            chrono::NaiveDate::from_ymd_opt(2023, 2, 1)
        );
    }
}
