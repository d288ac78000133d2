use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;

/// Hash of the temporary password given out on reset.
pub const DEFAULT_PASSWORD_HASH: &str =
    "6732F21FF7E8A7A76CE0426C76BE0B0155352D67C588608C8BF8D7FF4AB6B0A6";
pub const DEFAULT_PASSWORD_SALT: &str = "cRdWiWpJEjPZ8gjq6P1SQLkHTuM=";

/// A staff member, auditor or web portal user.
///
/// `web_id`, `auditor_id` and `staff_id` are the keys of the matching role
/// rows, or `None` when the user does not hold that role. Credentials never
/// leave the process.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub web_id: Option<i64>,
    pub auditor_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub full_name: String,
    pub user_position: Option<String>,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub password_salt: String,
    pub phone: Option<String>,
    pub phone_secondary: Option<String>,
    pub domain_user_name: Option<String>,
    pub training_plan: Option<String>,
    pub is_admin: bool,
    pub active: bool,
    pub send_newsletter: bool,
    pub send_promotions: bool,
}

impl Default for User {
    fn default() -> Self {
        Self {
            user_id: UNSET_ID,
            web_id: None,
            auditor_id: None,
            staff_id: None,
            full_name: String::new(),
            user_position: None,
            email: String::new(),
            password: DEFAULT_PASSWORD_HASH.to_string(),
            password_salt: DEFAULT_PASSWORD_SALT.to_string(),
            phone: None,
            phone_secondary: None,
            domain_user_name: None,
            training_plan: None,
            is_admin: false,
            active: true,
            send_newsletter: false,
            send_promotions: false,
        }
    }
}

impl User {
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.full_name.split(' ').next().unwrap_or_default()
    }

    /// Tag placed in email subjects so incoming mail can be filed, e.g. `UID00042`.
    #[must_use]
    pub fn user_id_string(&self) -> String {
        format!("UID{:0>5}", self.user_id)
    }

    /// Network folder under `web_users_folder`: `{root}{INITIAL}\{full name}_{id}`.
    #[must_use]
    pub fn folder(&self, web_users_folder: &str) -> Option<String> {
        let initial = self.full_name.chars().next()?.to_uppercase();
        Some(format!(
            "{web_users_folder}{initial}\\{}_{}",
            self.full_name, self.user_id
        ))
    }

    #[must_use]
    pub fn email_folder(&self, web_users_folder: &str) -> Option<String> {
        self.folder(web_users_folder).map(|f| format!("{f}\\Email"))
    }

    #[must_use]
    pub fn email_attachments_folder(&self, web_users_folder: &str) -> Option<String> {
        self.email_folder(web_users_folder)
            .map(|f| format!("{f}\\Attachments"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn jane() -> User {
        User {
            user_id: 42,
            full_name: "jane Citizen".into(),
            email: "jane@example.com".into(),
            ..User::default()
        }
    }

    #[test]
    fn first_name_is_first_token() {
        assert_eq!(jane().first_name(), "jane");
        assert_eq!(User::default().first_name(), "");
    }

    #[test]
    fn user_id_string_pads_to_five() {
        assert_eq!(jane().user_id_string(), "UID00042");
        let big = User {
            user_id: 1_234_567,
            ..jane()
        };
        assert_eq!(big.user_id_string(), "UID1234567");
    }

    #[test]
    fn folders_nest_under_initial() {
        let user = jane();
        assert_eq!(
            user.folder("S:\\Web Users\\").as_deref(),
            Some("S:\\Web Users\\J\\jane Citizen_42")
        );
        assert_eq!(
            user.email_attachments_folder("S:\\Web Users\\").as_deref(),
            Some("S:\\Web Users\\J\\jane Citizen_42\\Email\\Attachments")
        );
        assert_eq!(User::default().folder("S:\\"), None);
    }

    #[test]
    fn credentials_are_not_serialized() {
        let json = serde_json::to_value(jane()).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordSalt").is_none());
        assert_eq!(json["fullName"], "jane Citizen");
    }
}
