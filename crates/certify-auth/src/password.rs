//! Salted SHA-256 password hashes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Bytes of randomness in a generated salt.
const SALT_BYTES: usize = 20;

/// Uppercase hex SHA-256 of `salt` followed by `password`.
#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode_upper(hasher.finalize())
}

/// Compare a candidate password against a stored hash. Case of the stored
/// hex is ignored.
#[must_use]
pub fn verify_password(stored_hash: &str, salt: &str, candidate: &str) -> bool {
    hash_password(salt, candidate).eq_ignore_ascii_case(stored_hash.trim())
}

/// Fresh base64 salt.
///
/// # Errors
///
/// Returns `AuthError::Random` if the OS random source is unavailable.
pub fn generate_salt() -> Result<String, AuthError> {
    let mut bytes = [0u8; SALT_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| AuthError::Random(e.to_string()))?;
    Ok(STANDARD.encode(bytes))
}

/// New salt and the hash of `password` under it.
///
/// # Errors
///
/// Returns `AuthError::Random` if the OS random source is unavailable.
pub fn new_credentials(password: &str) -> Result<(String, String), AuthError> {
    let salt = generate_salt()?;
    let hash = hash_password(&salt, password);
    Ok((hash, salt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use certify_core::entities::{DEFAULT_PASSWORD_HASH, DEFAULT_PASSWORD_SALT};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_salt_hashes_password_alone() {
        assert_eq!(
            hash_password("", "abc"),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[test]
    fn reset_credentials_match_temporary_password() {
        assert_eq!(
            hash_password(DEFAULT_PASSWORD_SALT, "h0neyB33"),
            DEFAULT_PASSWORD_HASH
        );
        assert!(verify_password(DEFAULT_PASSWORD_HASH, DEFAULT_PASSWORD_SALT, "h0neyB33"));
        assert!(!verify_password(DEFAULT_PASSWORD_HASH, DEFAULT_PASSWORD_SALT, "h0neyb33"));
    }

    #[test]
    fn stored_hash_case_is_ignored() {
        let lower = hash_password("salt", "secret").to_lowercase();
        assert!(verify_password(&lower, "salt", "secret"));
    }

    #[test]
    fn generated_salts_differ() {
        let a = generate_salt().unwrap();
        let b = generate_salt().unwrap();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), SALT_BYTES);
    }

    #[test]
    fn new_credentials_verify() {
        let (hash, salt) = new_credentials("correct horse").unwrap();
        assert!(verify_password(&hash, &salt, "correct horse"));
    }
}
