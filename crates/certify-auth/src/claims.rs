use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use certify_core::enums::ApiRole;

/// Claims carried by a Certify access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifyClaims {
    /// User id as a decimal string.
    pub sub: String,
    #[serde(rename = "role", default)]
    pub roles: Vec<ApiRole>,
    pub iat: i64,
    pub exp: i64,
}

impl CertifyClaims {
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    #[must_use]
    pub fn has_role(&self, role: ApiRole) -> bool {
        self.roles.contains(&role)
    }

    /// True if the token carries at least one of `roles`.
    #[must_use]
    pub fn has_any_role(&self, roles: &[ApiRole]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
