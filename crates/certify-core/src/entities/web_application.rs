use chrono::{NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UNSET_ID;
use crate::options::{SelectedOptions, parse_option_string};

/// An online application for certification.
///
/// `service_ids` and `client_category_ids` are derived from
/// `option_string` when the application is fetched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebApplication {
    pub id: i64,
    pub client_id: Option<i64>,
    pub company: Option<String>,
    pub user_name: Option<String>,
    pub work_flow: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub declaration_date_time: Option<NaiveDateTime>,
    pub option_string: Option<String>,
    pub notes: Option<String>,
    pub result: Option<String>,
    #[serde(rename = "type")]
    pub application_type: Option<String>,
    pub requires_tests: bool,
    pub expedite: bool,
    pub is_plan: bool,
    pub service_ids: Vec<i64>,
    pub client_category_ids: Vec<i64>,
    pub application_fee_exempt: bool,
    pub check_date: Option<NaiveDate>,
    pub is_deleted: bool,
}

impl Default for WebApplication {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            client_id: None,
            company: None,
            user_name: None,
            work_flow: None,
            applicant_name: None,
            applicant_email: None,
            applicant_phone: None,
            declaration_date_time: None,
            option_string: None,
            notes: None,
            result: None,
            application_type: None,
            requires_tests: false,
            expedite: false,
            is_plan: false,
            service_ids: Vec::new(),
            client_category_ids: Vec::new(),
            application_fee_exempt: false,
            check_date: None,
            is_deleted: false,
        }
    }
}

impl WebApplication {
    /// Standards and categories named in the option string.
    #[must_use]
    pub fn selected_options(&self) -> SelectedOptions {
        self.option_string
            .as_deref()
            .map(parse_option_string)
            .unwrap_or_default()
    }
}

/// One answered question on an application form.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebApplicationResponse {
    pub id: i64,
    #[serde(rename = "web_applicationId")]
    pub web_application_id: i64,
    pub app_form_question_id: i64,
    pub question: Option<String>,
    pub response: Option<String>,
    pub section: Option<String>,
    pub section_sub_title: Option<String>,
}
