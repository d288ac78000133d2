use certify_core::entities::{Audit, AuditAddress};
use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;
use crate::service::CertifyService;

fn row_to_audit_address(row: &libsql::Row) -> Result<AuditAddress, DatabaseError> {
    Ok(AuditAddress {
        id: row.get::<i64>(0)?,
        audit_id: row.get::<i64>(1)?,
        client_address_id: row.get::<i64>(2)?,
    })
}

impl CertifyService {
    pub async fn fetch_audit_address(&self, id: i64) -> Result<AuditAddress, DatabaseError> {
        self.db()
            .query_one(
                "SELECT id, audit_id, client_address_id FROM audit_addresses WHERE id = ?1",
                vec![id.into()],
                row_to_audit_address,
            )
            .await?
            .ok_or_else(|| DatabaseError::not_found("audit_address", id))
    }

    pub async fn addresses_for_audit(&self, audit_id: i64) -> Result<Vec<AuditAddress>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT id, audit_id, client_address_id FROM audit_addresses
                 WHERE audit_id = ?1 ORDER BY id",
                vec![audit_id.into()],
                row_to_audit_address,
            )
            .await
    }

    pub async fn save_audit_address(&self, audit_address: &AuditAddress) -> Result<i64, DatabaseError> {
        if audit_address.audit_id == UNSET_ID || audit_address.client_address_id == UNSET_ID {
            return Err(DatabaseError::validation(
                "An audit address needs both an audit and an address",
            ));
        }
        if audit_address.id == UNSET_ID {
            return self
                .db()
                .insert(
                    "INSERT INTO audit_addresses (audit_id, client_address_id) VALUES (?1, ?2)",
                    vec![audit_address.audit_id.into(), audit_address.client_address_id.into()],
                )
                .await;
        }
        self.db()
            .execute(
                "UPDATE audit_addresses SET audit_id = ?1, client_address_id = ?2 WHERE id = ?3",
                vec![
                    audit_address.audit_id.into(),
                    audit_address.client_address_id.into(),
                    audit_address.id.into(),
                ],
            )
            .await?;
        Ok(audit_address.id)
    }

    /// Attach the client's audited addresses whose short form appears in
    /// `pretty_short`. True when every requested address was found.
    pub async fn add_audit_addresses(
        &self,
        audit: &Audit,
        pretty_short: &[&str],
    ) -> Result<bool, DatabaseError> {
        let candidates = self.addresses_for_client(audit.client_id, true).await?;
        let mut saved = 0;
        for wanted in pretty_short {
            let Some(address) = candidates.iter().find(|a| a.pretty_address_short == *wanted) else {
                tracing::debug!(audit_id = audit.id, address = %wanted, "no audited address matches");
                continue;
            };
            self.save_audit_address(&AuditAddress {
                id: UNSET_ID,
                audit_id: audit.id,
                client_address_id: address.id,
            })
            .await?;
            saved += 1;
        }
        Ok(saved == pretty_short.len())
    }

    pub async fn delete_audit_address(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute("DELETE FROM audit_addresses WHERE id = ?1", vec![id.into()])
            .await?;
        Ok(())
    }

    /// Remove every address from an audit. Returns the number removed.
    pub async fn delete_audit_addresses(&self, audit_id: i64) -> Result<u64, DatabaseError> {
        self.db()
            .execute(
                "DELETE FROM audit_addresses WHERE audit_id = ?1",
                vec![audit_id.into()],
            )
            .await
    }
}
