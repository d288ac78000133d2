//! # certify-auth
//!
//! Credentials and bearer tokens for the Certify REST API.
//!
//! Passwords are stored as uppercase hex SHA-256 of `salt + password`.
//! Access tokens are HS256 JWTs carrying the user id and API roles,
//! issued by [`TokenIssuer`] after a password grant.

pub mod claims;
pub mod error;
pub mod password;
pub mod token;

pub use claims::CertifyClaims;
pub use error::AuthError;
pub use token::{IssuedToken, TokenIssuer, generate_signing_key};
