//! Store error types

use rusqlite::ErrorCode;
use shared::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: &'static str },

    #[error("JHA {jha_id} has no step number left after {highest}")]
    NumberingExhausted { jha_id: i64, highest: u32 },

    #[error("{operation} gave up after {attempts} conflicting attempts")]
    Conflict { operation: &'static str, attempts: u32 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, id: impl Into<i64>) -> Self {
        StoreError::NotFound { entity, id: id.into() }
    }

    /// Busy and locked databases clear up once the other writer commits.
    /// Constraint violations are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                matches!(err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            }
            _ => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
