// src/infrastructure/repositories/sqlite/error.rs

use diesel::r2d2;
use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum SqliteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DieselError),

    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("Bookmark not found with ID: {0}")]
    BookmarkNotFound(i32),

    #[error("Failed to convert entity: {0}")]
    ConversionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

pub type SqliteResult<T> = Result<T, SqliteRepositoryError>;

impl From<r2d2::Error> for SqliteRepositoryError {
    fn from(err: r2d2::Error) -> Self {
        SqliteRepositoryError::ConnectionPoolError(err.to_string())
    }
}

impl From<SqliteRepositoryError> for DomainError {
    fn from(err: SqliteRepositoryError) -> Self {
        match err {
            SqliteRepositoryError::BookmarkNotFound(id) => {
                DomainError::BookmarkNotFound(id.to_string())
            }
            SqliteRepositoryError::DatabaseError(DieselError::NotFound) => {
                DomainError::BookmarkNotFound("Resource not found".to_string())
            }
            SqliteRepositoryError::DatabaseError(DieselError::DatabaseError(_, info)) => {
                DomainError::Store(info.message().to_string())
            }
            SqliteRepositoryError::IoError(e) => DomainError::Io(e),
            err => DomainError::Store(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_not_found_when_converted_then_domain_not_found() {
        let err: DomainError = SqliteRepositoryError::BookmarkNotFound(4).into();
        assert!(matches!(err, DomainError::BookmarkNotFound(id) if id == "4"));
    }

    #[test]
    fn given_pool_error_when_converted_then_store_error_with_message() {
        let err: DomainError =
            SqliteRepositoryError::ConnectionPoolError("timed out".to_string()).into();
        assert_eq!(err.to_string(), "Connection pool error: timed out");
    }
}
