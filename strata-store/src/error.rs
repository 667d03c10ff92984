//! Error types for the store.

use strata_model::EntityError;
use thiserror::Error;

/// Store-level errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity construction or patch application failed.
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// The store already has the configured maximum number of listeners.
    #[error("listener limit reached (max {0})")]
    ListenerLimit(usize),

    /// Configuration JSON is malformed.
    #[error("invalid store config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
