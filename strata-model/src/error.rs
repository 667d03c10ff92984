//! Error types for the entity model.

use thiserror::Error;

/// Errors raised by entity construction and patch application.
///
/// Patch keys that are not part of the entity's shape are not an error;
/// they are dropped during merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// The patch was missing, or was neither a field mapping nor a reset.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// A declared field received a value of the wrong kind.
    #[error("field `{field}` expects {expected}, found {found}")]
    FieldType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The factory produced something that is not an instance of the shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;
