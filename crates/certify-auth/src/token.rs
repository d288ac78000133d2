//! HS256 access tokens for the password grant.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use certify_config::AuthConfig;
use certify_core::enums::ApiRole;

use crate::claims::CertifyClaims;
use crate::error::AuthError;

/// Bytes of randomness in a generated signing key.
const SIGNING_KEY_BYTES: usize = 48;

/// Body returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// Signs and verifies access tokens with one shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` for an empty secret.
    pub fn new(secret: &str, ttl: TimeDelta) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` when `auth.signing_key` is empty.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let hours = i64::try_from(config.token_ttl_hours).unwrap_or(i64::MAX);
        let ttl = TimeDelta::try_hours(hours).unwrap_or(TimeDelta::MAX);
        Self::new(&config.signing_key, ttl)
    }

    #[must_use]
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a token for `user_id` carrying `roles`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encoding` if signing fails.
    pub fn issue(&self, user_id: i64, roles: Vec<ApiRole>) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let claims = CertifyClaims {
            sub: user_id.to_string(),
            roles,
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .map_or(i64::MAX, |at| at.timestamp()),
        };
        self.sign(&claims)
    }

    /// Sign prepared claims. `expires_in` is measured from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encoding` if signing fails.
    pub fn sign(&self, claims: &CertifyClaims) -> Result<IssuedToken, AuthError> {
        let access_token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;
        Ok(IssuedToken {
            access_token,
            token_type: "bearer".into(),
            expires_in: (claims.exp - Utc::now().timestamp()).max(0),
        })
    }

    /// Check signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// `TokenExpired` past `exp`, `InvalidToken` for anything else wrong.
    pub fn verify(&self, token: &str) -> Result<CertifyClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        let data = decode::<CertifyClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

/// Random URL-safe secret suitable for `auth.signing_key`.
///
/// # Errors
///
/// Returns `AuthError::Random` if the OS random source is unavailable.
pub fn generate_signing_key() -> Result<String, AuthError> {
    let mut bytes = [0u8; SIGNING_KEY_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| AuthError::Random(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
