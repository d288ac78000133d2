use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;

/// A physical or postal address belonging to a client.
///
/// `state`, `state_abbreviation`, `country`, `modifier` and the two pretty
/// forms are resolved from lookup tables when the address is fetched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientAddress {
    pub id: i64,
    pub client_id: i64,
    pub property_name: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub town: Option<String>,
    pub list_state_id: Option<i64>,
    pub state: Option<String>,
    pub state_abbreviation: Option<String>,
    pub list_country_id: Option<i64>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub pretty_address: String,
    pub pretty_address_short: String,
    pub restriction: Option<String>,
    pub restriction_reason: Option<String>,
    pub restriction_end_date: Option<NaiveDate>,
    pub list_client_address_modifier_id: Option<i64>,
    pub modifier: Option<String>,
    pub is_operation_address: bool,
    pub is_postal_address: bool,
    pub requires_audit: bool,
    pub applied_date: Option<NaiveDate>,
    pub certified_organic_date: Option<NaiveDate>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub audited_with_main: bool,
    pub uses: Vec<ClientAddressUse>,
    pub sampling: Option<ClientAddressSample>,
}

impl Default for ClientAddress {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            client_id: UNSET_ID,
            property_name: None,
            street1: None,
            street2: None,
            town: None,
            list_state_id: None,
            state: None,
            state_abbreviation: None,
            list_country_id: None,
            country: None,
            region: None,
            postcode: None,
            pretty_address: String::new(),
            pretty_address_short: String::new(),
            restriction: None,
            restriction_reason: None,
            restriction_end_date: None,
            list_client_address_modifier_id: None,
            modifier: None,
            is_operation_address: false,
            is_postal_address: false,
            requires_audit: true,
            applied_date: None,
            certified_organic_date: None,
            latitude: None,
            longitude: None,
            audited_with_main: true,
            uses: Vec::new(),
            sampling: None,
        }
    }
}

impl ClientAddress {
    /// Format the address on one line.
    ///
    /// `shorter` uses the state abbreviation and drops the country.
    /// Blank parts are skipped.
    #[must_use]
    pub fn pretty(&self, include_property: bool, shorter: bool) -> String {
        let state = if shorter {
            self.state_abbreviation.as_deref().or(self.state.as_deref())
        } else {
            self.state.as_deref()
        };
        let country = if shorter { None } else { self.country.as_deref() };

        let parts: Vec<&str> = [
            self.street1.as_deref(),
            self.street2.as_deref(),
            self.town.as_deref(),
            state,
            country,
            self.postcode.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

        let mut line = parts.join(", ");
        if include_property {
            if let Some(property) = self
                .property_name
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
            {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push('(');
                line.push_str(property);
                line.push(')');
            }
        }
        line
    }

    /// Fill `pretty_address` and `pretty_address_short` from the parts.
    pub fn refresh_pretty(&mut self) {
        self.pretty_address = self.pretty(true, false);
        self.pretty_address_short = self.pretty(true, true);
    }

    #[must_use]
    pub fn has_use(&self, list_client_address_use_id: i64) -> bool {
        self.uses
            .iter()
            .any(|u| u.list_client_address_use_id == list_client_address_use_id)
    }

    /// Add a use unless the address already has it. Returns whether it was added.
    pub fn add_use(&mut self, list_client_address_use_id: i64) -> bool {
        if self.has_use(list_client_address_use_id) {
            return false;
        }
        self.uses.push(ClientAddressUse {
            id: UNSET_ID,
            client_address_id: self.id,
            list_client_address_use_id,
            address_use: None,
        });
        true
    }
}

/// What an address is used for, e.g. "Grazing".
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientAddressUse {
    pub id: i64,
    pub client_address_id: i64,
    pub list_client_address_use_id: i64,
    pub address_use: Option<String>,
}

/// Residue sampling plan for an address.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientAddressSample {
    pub id: i64,
    pub client_address_id: i64,
    pub next_sample_year: Option<i64>,
    pub next_sample_instructions: Option<String>,
}
