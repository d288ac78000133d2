//! Client address repository, including address uses and sampling plans.

use certify_core::entities::{ClientAddress, ClientAddressSample, ClientAddressUse};
use certify_core::ids::UNSET_ID;
use certify_core::names::{ADDRESS_MODIFIER_PRIVATE, OPERATION_ADDRESS_USES};

use crate::error::DatabaseError;
use crate::helpers::{
    flag, get_flag, get_opt_date, get_opt_id, get_opt_string, opt_date, opt_id, opt_text, text,
};
use crate::repos::lookup::LookupList;
use crate::service::CertifyService;

const ADDRESS_SELECT: &str = "SELECT a.id, a.client_id, a.property_name, a.street1, a.street2, a.town,
     a.list_state_id, st.name, st.abbreviation, a.list_country_id, co.name, a.region, a.postcode,
     a.restriction, a.restriction_reason, a.restriction_end_date,
     a.list_client_address_modifier_id, m.name,
     a.is_operation_address, a.is_postal_address, a.requires_audit,
     a.applied_date, a.certified_organic_date, a.latitude, a.longitude, a.audited_with_main
     FROM client_addresses a
     LEFT JOIN list_state st ON st.id = a.list_state_id
     LEFT JOIN list_country co ON co.id = a.list_country_id
     LEFT JOIN list_client_address_modifier m ON m.id = a.list_client_address_modifier_id";

fn row_to_address(row: &libsql::Row) -> Result<ClientAddress, DatabaseError> {
    let mut address = ClientAddress {
        id: row.get::<i64>(0)?,
        client_id: row.get::<i64>(1)?,
        property_name: get_opt_string(row, 2)?,
        street1: get_opt_string(row, 3)?,
        street2: get_opt_string(row, 4)?,
        town: get_opt_string(row, 5)?,
        list_state_id: get_opt_id(row, 6)?,
        state: get_opt_string(row, 7)?,
        state_abbreviation: get_opt_string(row, 8)?,
        list_country_id: get_opt_id(row, 9)?,
        country: get_opt_string(row, 10)?,
        region: get_opt_string(row, 11)?,
        postcode: get_opt_string(row, 12)?,
        restriction: get_opt_string(row, 13)?,
        restriction_reason: get_opt_string(row, 14)?,
        restriction_end_date: get_opt_date(row, 15)?,
        list_client_address_modifier_id: get_opt_id(row, 16)?,
        modifier: get_opt_string(row, 17)?,
        is_operation_address: get_flag(row, 18)?,
        is_postal_address: get_flag(row, 19)?,
        requires_audit: get_flag(row, 20)?,
        applied_date: get_opt_date(row, 21)?,
        certified_organic_date: get_opt_date(row, 22)?,
        latitude: get_opt_string(row, 23)?,
        longitude: get_opt_string(row, 24)?,
        audited_with_main: get_flag(row, 25)?,
        ..ClientAddress::default()
    };
    address.refresh_pretty();
    Ok(address)
}

impl CertifyService {
    /// A live address with its uses and sampling plan.
    pub async fn fetch_client_address(&self, id: i64) -> Result<ClientAddress, DatabaseError> {
        let sql = format!("{ADDRESS_SELECT} WHERE a.id = ?1 AND a.is_deleted = 0");
        let address = self
            .db()
            .query_one(&sql, vec![id.into()], row_to_address)
            .await?
            .ok_or_else(|| DatabaseError::not_found("client_address", id))?;
        self.with_children(address).await
    }

    async fn with_children(&self, mut address: ClientAddress) -> Result<ClientAddress, DatabaseError> {
        address.uses = self.address_uses(address.id).await?;
        address.sampling = self.address_sample(address.id).await?;
        Ok(address)
    }

    async fn addresses_where(
        &self,
        filter: &str,
        params: Vec<libsql::Value>,
    ) -> Result<Vec<ClientAddress>, DatabaseError> {
        let sql = format!("{ADDRESS_SELECT} WHERE a.is_deleted = 0 {filter} ORDER BY a.id");
        let addresses = self.db().query_map(&sql, params, row_to_address).await?;
        let mut out = Vec::with_capacity(addresses.len());
        for address in addresses {
            out.push(self.with_children(address).await?);
        }
        Ok(out)
    }

    /// Live addresses of a client, optionally only those needing audit.
    pub async fn addresses_for_client(
        &self,
        client_id: i64,
        requires_audit_only: bool,
    ) -> Result<Vec<ClientAddress>, DatabaseError> {
        let filter = if requires_audit_only {
            "AND a.client_id = ?1 AND a.requires_audit = 1"
        } else {
            "AND a.client_id = ?1"
        };
        self.addresses_where(filter, vec![client_id.into()]).await
    }

    /// Every live address of every live client.
    pub async fn all_addresses(&self) -> Result<Vec<ClientAddress>, DatabaseError> {
        self.addresses_where(
            "AND a.client_id IN (SELECT id FROM clients WHERE is_deleted = 0)",
            vec![],
        )
        .await
    }

    pub async fn operation_address(&self, client_id: i64) -> Result<Option<ClientAddress>, DatabaseError> {
        Ok(self
            .addresses_where(
                "AND a.client_id = ?1 AND a.is_operation_address = 1",
                vec![client_id.into()],
            )
            .await?
            .into_iter()
            .next())
    }

    pub async fn postal_address(&self, client_id: i64) -> Result<Option<ClientAddress>, DatabaseError> {
        Ok(self
            .addresses_where(
                "AND a.client_id = ?1 AND a.is_postal_address = 1",
                vec![client_id.into()],
            )
            .await?
            .into_iter()
            .next())
    }

    /// Live addresses that may be printed on a certificate or invoice.
    ///
    /// Private addresses are left off; an address without a modifier is kept.
    pub async fn addresses_for_certificate(&self, client_id: i64) -> Result<Vec<ClientAddress>, DatabaseError> {
        self.addresses_where(
            "AND a.client_id = ?1 AND COALESCE(m.name, '') <> ?2",
            vec![client_id.into(), text(ADDRESS_MODIFIER_PRIVATE)],
        )
        .await
    }

    pub async fn address_exists(&self, id: i64) -> Result<bool, DatabaseError> {
        self.db()
            .exists(
                "SELECT COUNT(*) FROM client_addresses WHERE id = ?1 AND is_deleted = 0",
                vec![id.into()],
            )
            .await
    }

    /// Insert or update an address with its uses and sampling plan. Returns its id.
    pub async fn save_client_address(&self, address: &ClientAddress) -> Result<i64, DatabaseError> {
        if address.client_id == UNSET_ID {
            return Err(DatabaseError::validation("An address must belong to a client"));
        }
        let mut params = vec![
            address.client_id.into(),
            opt_text(address.property_name.as_deref()),
            opt_text(address.street1.as_deref()),
            opt_text(address.street2.as_deref()),
            opt_text(address.town.as_deref()),
            opt_id(address.list_state_id),
            opt_id(address.list_country_id),
            opt_text(address.region.as_deref()),
            opt_text(address.postcode.as_deref()),
            opt_text(address.restriction.as_deref()),
            opt_text(address.restriction_reason.as_deref()),
            opt_date(address.restriction_end_date),
            opt_id(address.list_client_address_modifier_id),
            flag(address.is_operation_address),
            flag(address.is_postal_address),
            flag(address.requires_audit),
            opt_date(address.applied_date),
            opt_date(address.certified_organic_date),
            opt_text(address.latitude.as_deref()),
            opt_text(address.longitude.as_deref()),
            flag(address.audited_with_main),
        ];

        let id = if address.id == UNSET_ID {
            self.db()
                .insert(
                    "INSERT INTO client_addresses (client_id, property_name, street1, street2, town,
                     list_state_id, list_country_id, region, postcode, restriction, restriction_reason,
                     restriction_end_date, list_client_address_modifier_id, is_operation_address,
                     is_postal_address, requires_audit, applied_date, certified_organic_date,
                     latitude, longitude, audited_with_main)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21)",
                    params,
                )
                .await?
        } else {
            params.push(address.id.into());
            self.db()
                .execute(
                    "UPDATE client_addresses SET client_id = ?1, property_name = ?2, street1 = ?3,
                     street2 = ?4, town = ?5, list_state_id = ?6, list_country_id = ?7, region = ?8,
                     postcode = ?9, restriction = ?10, restriction_reason = ?11,
                     restriction_end_date = ?12, list_client_address_modifier_id = ?13,
                     is_operation_address = ?14, is_postal_address = ?15, requires_audit = ?16,
                     applied_date = ?17, certified_organic_date = ?18, latitude = ?19,
                     longitude = ?20, audited_with_main = ?21
                     WHERE id = ?22",
                    params,
                )
                .await?;
            address.id
        };

        self.replace_address_uses(id, &address.uses).await?;
        if let Some(sample) = &address.sampling {
            self.save_address_sample(id, sample).await?;
        }
        Ok(id)
    }

    pub async fn delete_client_address(&self, id: i64) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "UPDATE client_addresses SET is_deleted = 1 WHERE id = ?1",
                vec![id.into()],
            )
            .await?;
        Ok(())
    }

    pub async fn address_uses(&self, client_address_id: i64) -> Result<Vec<ClientAddressUse>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT u.id, u.client_address_id, u.list_client_address_use_id, l.name
                 FROM client_address_uses u
                 LEFT JOIN list_client_address_use l ON l.id = u.list_client_address_use_id
                 WHERE u.client_address_id = ?1
                 ORDER BY l.name",
                vec![client_address_id.into()],
                |row| {
                    Ok(ClientAddressUse {
                        id: row.get::<i64>(0)?,
                        client_address_id: row.get::<i64>(1)?,
                        list_client_address_use_id: row.get::<i64>(2)?,
                        address_use: get_opt_string(row, 3)?,
                    })
                },
            )
            .await
    }

    async fn replace_address_uses(
        &self,
        client_address_id: i64,
        uses: &[ClientAddressUse],
    ) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "DELETE FROM client_address_uses WHERE client_address_id = ?1",
                vec![client_address_id.into()],
            )
            .await?;
        for address_use in uses {
            self.db()
                .insert(
                    "INSERT INTO client_address_uses (client_address_id, list_client_address_use_id)
                     VALUES (?1, ?2)",
                    vec![client_address_id.into(), address_use.list_client_address_use_id.into()],
                )
                .await?;
        }
        Ok(())
    }

    /// Record that a client category implies an address use.
    pub async fn add_category_address_use(
        &self,
        list_client_category_id: i64,
        list_client_address_use_id: i64,
    ) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "INSERT OR IGNORE INTO client_category_address_uses
                 (list_client_category_id, list_client_address_use_id) VALUES (?1, ?2)",
                vec![list_client_category_id.into(), list_client_address_use_id.into()],
            )
            .await?;
        Ok(())
    }

    /// Address uses implied by the client's live categories.
    pub async fn category_address_use_ids(&self, client_id: i64) -> Result<Vec<i64>, DatabaseError> {
        self.db()
            .query_map(
                "SELECT DISTINCT m.list_client_address_use_id
                 FROM client_categories cc
                 JOIN client_category_address_uses m
                   ON m.list_client_category_id = cc.list_client_category_id
                 WHERE cc.client_id = ?1 AND cc.is_deleted = 0
                 ORDER BY m.list_client_address_use_id",
                vec![client_id.into()],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await
    }

    /// Add the uses the client's categories imply. `false` when the client
    /// has no live categories, leaving the uses untouched.
    async fn add_category_uses(
        &self,
        address: &mut ClientAddress,
        replace_existing: bool,
    ) -> Result<bool, DatabaseError> {
        let has_categories = self
            .db()
            .exists(
                "SELECT COUNT(*) FROM client_categories WHERE client_id = ?1 AND is_deleted = 0",
                vec![address.client_id.into()],
            )
            .await?;
        if !has_categories {
            return Ok(false);
        }
        if replace_existing {
            address.uses.clear();
        }
        for use_id in self.category_address_use_ids(address.client_id).await? {
            address.add_use(use_id);
        }
        Ok(true)
    }

    /// Give an address the uses implied by its client's categories.
    ///
    /// Returns `false` without writing when the client has no live categories.
    pub async fn apply_category_uses(
        &self,
        client_address_id: i64,
        replace_existing: bool,
    ) -> Result<bool, DatabaseError> {
        let mut address = self.fetch_client_address(client_address_id).await?;
        if !self.add_category_uses(&mut address, replace_existing).await? {
            return Ok(false);
        }
        self.replace_address_uses(address.id, &address.uses).await?;
        Ok(true)
    }

    /// Replace the address uses with the named ones. Returns how many were stored.
    ///
    /// Names missing from the use list are skipped with a warning.
    pub async fn update_address_uses(
        &self,
        client_address_id: i64,
        names: &[&str],
    ) -> Result<usize, DatabaseError> {
        let mut address = self.fetch_client_address(client_address_id).await?;
        address.uses.clear();
        for name in names {
            match self.lookup_id(LookupList::ClientAddressUse, name).await? {
                Some(use_id) => {
                    address.add_use(use_id);
                }
                None => tracing::warn!(client_address_id, name = %name, "unknown client address use"),
            }
        }
        self.replace_address_uses(address.id, &address.uses).await?;
        Ok(address.uses.len())
    }

    /// Reset an address to its starting uses and return them.
    ///
    /// An operation address gets Records, Labelling and Packaging; every
    /// address then gets the uses its client's categories imply.
    pub async fn set_default_uses(
        &self,
        client_address_id: i64,
    ) -> Result<Vec<ClientAddressUse>, DatabaseError> {
        let mut address = self.fetch_client_address(client_address_id).await?;
        address.uses.clear();
        if address.is_operation_address {
            for name in OPERATION_ADDRESS_USES {
                let use_id = self.ensure_lookup(LookupList::ClientAddressUse, name).await?;
                address.add_use(use_id);
            }
        }
        self.add_category_uses(&mut address, false).await?;
        self.replace_address_uses(address.id, &address.uses).await?;
        self.address_uses(address.id).await
    }

    pub async fn address_sample(
        &self,
        client_address_id: i64,
    ) -> Result<Option<ClientAddressSample>, DatabaseError> {
        self.db()
            .query_one(
                "SELECT id, client_address_id, next_sample_year, next_sample_instructions
                 FROM client_address_samples WHERE client_address_id = ?1
                 ORDER BY id LIMIT 1",
                vec![client_address_id.into()],
                |row| {
                    Ok(ClientAddressSample {
                        id: row.get::<i64>(0)?,
                        client_address_id: row.get::<i64>(1)?,
                        next_sample_year: get_opt_id(row, 2)?,
                        next_sample_instructions: get_opt_string(row, 3)?,
                    })
                },
            )
            .await
    }

    async fn save_address_sample(
        &self,
        client_address_id: i64,
        sample: &ClientAddressSample,
    ) -> Result<i64, DatabaseError> {
        let existing = self.address_sample(client_address_id).await?;
        let params = vec![
            opt_id(sample.next_sample_year),
            opt_text(sample.next_sample_instructions.as_deref()),
            client_address_id.into(),
        ];
        match existing {
            Some(existing) => {
                let mut params = params;
                params.push(existing.id.into());
                self.db()
                    .execute(
                        "UPDATE client_address_samples SET next_sample_year = ?1,
                         next_sample_instructions = ?2, client_address_id = ?3
                         WHERE id = ?4",
                        params,
                    )
                    .await?;
                Ok(existing.id)
            }
            None => {
                self.db()
                    .insert(
                        "INSERT INTO client_address_samples
                         (next_sample_year, next_sample_instructions, client_address_id)
                         VALUES (?1, ?2, ?3)",
                        params,
                    )
                    .await
            }
        }
    }
}
