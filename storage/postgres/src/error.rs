use boxoffice_core::error::StorageError;
use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] bb8::RunError<tokio_postgres::Error>),
    #[error("storage engine is closed")]
    Closed,
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self { StorageError::Backend(Box::new(err)) }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    CheckViolation { constraint: Option<String> },
    Unknown,
}

/// Classify a driver error by its SQLSTATE. A check violation is an expected rejection; anything
/// else is a genuine failure.
pub fn error_kind(err: &tokio_postgres::Error) -> ErrorKind {
    match err.as_db_error() {
        Some(db_error) if *db_error.code() == SqlState::CHECK_VIOLATION => {
            ErrorKind::CheckViolation { constraint: db_error.constraint().map(str::to_owned) }
        }
        _ => ErrorKind::Unknown,
    }
}
