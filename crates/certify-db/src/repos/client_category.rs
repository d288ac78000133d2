use certify_core::entities::ClientCategory;
use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;
use crate::helpers::get_opt_string;
use crate::service::CertifyService;

fn row_to_category(row: &libsql::Row) -> Result<ClientCategory, DatabaseError> {
    Ok(ClientCategory {
        id: row.get::<i64>(0)?,
        client_id: row.get::<i64>(1)?,
        list_client_category_id: row.get::<i64>(2)?,
        name: get_opt_string(row, 3)?,
    })
}

impl CertifyService {
    pub async fn categories_for_client(&self, client_id: i64) -> Result<Vec<ClientCategory>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT cc.id, cc.client_id, cc.list_client_category_id, l.name
                 FROM client_categories cc
                 JOIN list_client_category l ON l.id = cc.list_client_category_id
                 WHERE cc.client_id = ?1 AND cc.is_deleted = 0
                 ORDER BY l.name",
                vec![client_id.into()],
                row_to_category,
            )
            .await
    }

    /// Attach a category to a client.
    ///
    /// Returns `false` without writing when the client already has it.
    pub async fn save_client_category(&self, category: &ClientCategory) -> Result<bool, DatabaseError> {
        if category.client_id == UNSET_ID || category.list_client_category_id == UNSET_ID {
            return Err(DatabaseError::validation(
                "A client category needs both a client and a category",
            ));
        }
        if self
            .client_has_category(category.client_id, category.list_client_category_id)
            .await?
        {
            return Ok(false);
        }
        self.db()
            .insert(
                "INSERT INTO client_categories (client_id, list_client_category_id) VALUES (?1, ?2)",
                vec![category.client_id.into(), category.list_client_category_id.into()],
            )
            .await?;
        Ok(true)
    }

    pub async fn delete_client_category(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "UPDATE client_categories SET is_deleted = 1 WHERE id = ?1",
                vec![id.into()],
            )
            .await?;
        Ok(())
    }
}
