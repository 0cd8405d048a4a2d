//! Domain errors for zero-coach.

use thiserror::Error;

use super::models::target::{CatalogError, TargetKeyError};

/// Errors raised by ports and their adapters.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid target key: {0}")]
    InvalidTargetKey(#[from] TargetKeyError),

    #[error("Upstream unavailable: {0}")]
    Unavailable(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

/// Errors returned by practice engine operations.
///
/// None of these are fatal; each is scoped to a single call and leaves the
/// persisted state as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid target key '{key}': {reason}")]
    InvalidTargetKey { key: String, reason: String },

    #[error("Invalid leniency threshold {value}: {reason}")]
    InvalidThreshold { value: f64, reason: String },

    #[error("Target catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Attempt ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("Practice state unavailable: {0}")]
    StateUnavailable(String),

    #[error("Another mutation is in progress; retry shortly")]
    Busy,

    #[error("Evaluation superseded by a newer request")]
    Superseded,
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn invalid_key(key: &str, err: &TargetKeyError) -> Self {
        Self::InvalidTargetKey { key: key.to_string(), reason: err.to_string() }
    }

    /// Failures caused by collaborators rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::CatalogUnavailable(_) | Self::LedgerUnavailable(_) | Self::StateUnavailable(_)
        )
    }
}
