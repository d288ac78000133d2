use certify_core::entities::{ClientContact, ClientContactListItem};
use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;
use crate::helpers::{flag, get_flag, get_opt_id, get_opt_string, opt_id, opt_text};
use crate::service::CertifyService;

fn row_to_contact(row: &libsql::Row) -> Result<ClientContact, DatabaseError> {
    Ok(ClientContact {
        id: row.get::<i64>(0)?,
        client_id: row.get::<i64>(1)?,
        list_contact_type_id: get_opt_id(row, 2)?,
        name: get_opt_string(row, 3)?,
        preferred_name: get_opt_string(row, 4)?,
        details: get_opt_string(row, 5)?,
        is_default: get_flag(row, 6)?,
        is_deleted: get_flag(row, 7)?,
    })
}

fn row_to_list_item(row: &libsql::Row) -> Result<ClientContactListItem, DatabaseError> {
    Ok(ClientContactListItem {
        id: row.get::<i64>(0)?,
        client_id: row.get::<i64>(1)?,
        name: get_opt_string(row, 2)?,
        preferred_name: get_opt_string(row, 3)?,
        contact_type: get_opt_string(row, 4)?,
        details: get_opt_string(row, 5)?,
        is_default: get_flag(row, 6)?,
    })
}

const LIST_SELECT: &str = "SELECT cc.id, cc.client_id, cc.name, cc.preferred_name, t.name, cc.details, cc.is_default
     FROM client_contacts cc
     JOIN clients c ON c.id = cc.client_id
     LEFT JOIN list_contact_type t ON t.id = cc.list_contact_type_id
     WHERE cc.is_deleted = 0 AND c.is_deleted = 0";

impl CertifyService {
    /// Live contacts for every live client, or for one client when given.
    pub async fn contact_list(
        &self,
        client_id: Option<i64>,
    ) -> Result<Vec<ClientContactListItem>, DatabaseError> {
        match client_id {
            Some(client_id) => {
                let sql = format!("{LIST_SELECT} AND cc.client_id = ?1 ORDER BY cc.is_default DESC, cc.id");
                self.db()
                    .query_map(&sql, vec![client_id.into()], row_to_list_item)
                    .await
            }
            None => {
                let sql = format!("{LIST_SELECT} ORDER BY cc.client_id, cc.is_default DESC, cc.id");
                self.db().query_map(&sql, vec![], row_to_list_item).await
            }
        }
    }

    pub async fn fetch_client_contact(&self, id: i64) -> Result<ClientContact, DatabaseError> {
        self.db()
            .query_one(
                "SELECT id, client_id, list_contact_type_id, name, preferred_name, details,
                 is_default, is_deleted
                 FROM client_contacts WHERE id = ?1 AND is_deleted = 0",
                vec![id.into()],
                row_to_contact,
            )
            .await?
            .ok_or_else(|| DatabaseError::not_found("client_contact", id))
    }

    /// Insert or update a contact. Returns its id.
    pub async fn save_client_contact(&self, contact: &ClientContact) -> Result<i64, DatabaseError> {
        if contact.client_id == UNSET_ID {
            return Err(DatabaseError::validation("A contact must belong to a client"));
        }
        let mut params = vec![
            contact.client_id.into(),
            opt_id(contact.list_contact_type_id),
            opt_text(contact.name.as_deref()),
            opt_text(contact.preferred_name.as_deref()),
            opt_text(contact.details.as_deref()),
            flag(contact.is_default),
        ];
        if contact.id == UNSET_ID {
            return self
                .db()
                .insert(
                    "INSERT INTO client_contacts (client_id, list_contact_type_id, name, preferred_name,
                     details, is_default)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params,
                )
                .await;
        }
        params.push(contact.id.into());
        self.db()
            .execute(
                "UPDATE client_contacts SET client_id = ?1, list_contact_type_id = ?2, name = ?3,
                 preferred_name = ?4, details = ?5, is_default = ?6
                 WHERE id = ?7",
                params,
            )
            .await?;
        Ok(contact.id)
    }

    pub async fn delete_client_contact(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "UPDATE client_contacts SET is_deleted = 1 WHERE id = ?1",
                vec![id.into()],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::lookup::LookupList;
    use crate::test_support::helpers::{seed_client, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn list_resolves_type_and_skips_deleted() {
        let (svc, _dir) = test_service().await;
        let client_id = seed_client(&svc, "Contact Co").await;
        let other = seed_client(&svc, "Other Co").await;
        let email = svc.ensure_lookup(LookupList::ContactType, "Email").await.unwrap();

        let id = svc
            .save_client_contact(&ClientContact {
                client_id,
                list_contact_type_id: Some(email),
                name: Some("Pat Lee".into()),
                details: Some("pat@example.com".into()),
                is_default: true,
                ..ClientContact::default()
            })
            .await
            .unwrap();
        let gone = svc
            .save_client_contact(&ClientContact {
                client_id,
                name: Some("Old Number".into()),
                ..ClientContact::default()
            })
            .await
            .unwrap();
        svc.save_client_contact(&ClientContact {
            client_id: other,
            name: Some("Someone Else".into()),
            ..ClientContact::default()
        })
        .await
        .unwrap();
        svc.delete_client_contact(gone).await.unwrap();

        let contacts = svc.contact_list(Some(client_id)).await.unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, id);
        assert_eq!(contacts[0].contact_type.as_deref(), Some("Email"));
        assert_eq!(svc.contact_list(None).await.unwrap().len(), 2);
        assert!(svc.fetch_client_contact(gone).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_keeps_id() {
        let (svc, _dir) = test_service().await;
        let client_id = seed_client(&svc, "Contact Co").await;
        let mut contact = ClientContact {
            client_id,
            details: Some("0400 000 000".into()),
            ..ClientContact::default()
        };
        contact.id = svc.save_client_contact(&contact).await.unwrap();
        contact.preferred_name = Some("Sam".into());
        assert_eq!(svc.save_client_contact(&contact).await.unwrap(), contact.id);
        assert_eq!(svc.fetch_client_contact(contact.id).await.unwrap(), contact);
    }
}
