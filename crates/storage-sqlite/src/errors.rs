//! Mapping from diesel errors into the core error taxonomy.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use evapro_core::errors::{DatabaseError, Error};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("record not found")]
    NotFound,

    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl From<DieselError> for StorageError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StorageError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StorageError::UniqueViolation(info.message().to_string())
            }
            other => StorageError::QueryFailed(other.to_string()),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation(message) => {
                Error::Database(DatabaseError::UniqueViolation(message))
            }
            StorageError::NotFound => {
                Error::Database(DatabaseError::QueryFailed("record not found".to_string()))
            }
            StorageError::QueryFailed(message) => {
                Error::Database(DatabaseError::QueryFailed(message))
            }
        }
    }
}
