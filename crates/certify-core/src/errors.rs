//! Cross-cutting error types for Certify.
//!
//! Storage errors live in `certify-db` and HTTP errors in `certify-api`;
//! this module only holds failures that domain rules themselves raise.

use thiserror::Error;

/// Errors that can be raised by any Certify crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed a domain rule (required fields, unknown names).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a `NotFound` with any displayable id.
    #[must_use]
    pub fn not_found(entity_type: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}
