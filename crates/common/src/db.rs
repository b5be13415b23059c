//! Shared database types for PropDesk repositories

use crate::error::Error;
use thiserror::Error;

/// Repository-level failures that callers may want to branch on
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    AlreadyExists,

    /// A compare-and-set update matched no row: the record changed since it was read
    #[error("Record was modified concurrently")]
    StaleWrite,

    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Error::NotFound("Record not found".to_string()),
            RepositoryError::AlreadyExists => Error::Conflict("Record already exists".to_string()),
            RepositoryError::StaleWrite => Error::Conflict(
                "Record was modified by another request; reload and retry".to_string(),
            ),
            RepositoryError::Connection(e) => Error::Database(e),
            RepositoryError::InvalidData(msg) => Error::Validation(msg),
        }
    }
}
