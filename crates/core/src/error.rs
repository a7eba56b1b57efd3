use crate::types::EntityId;

/// Domain-level error type shared across crates.
///
/// The API layer maps each variant onto an HTTP status and envelope error
/// code; nothing in this crate knows about HTTP.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
