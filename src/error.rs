//! Defines the crate level error type and its mapping from SQLite errors.

use crate::database_id::TransactionId;

/// The errors that may occur when reading from or writing to the ledger.
///
/// The `Display` text of each variant is intended to be shown to the user
/// as-is.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The input broke a domain rule, e.g. an unknown transaction type, a
    /// negative amount, a malformed date or an empty category name.
    #[error("invalid input: {0}")]
    ConstraintViolation(String),

    /// A category with the same name already exists.
    ///
    /// Names are compared case-sensitively and regardless of the category
    /// type.
    #[error("the category \"{0}\" already exists")]
    DuplicateName(String),

    /// Tried to update a transaction that does not exist.
    #[error("transaction {0} could not be found")]
    NotFound(TransactionId),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected storage error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database write lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

/// The coarse classification of an [Error].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [Error::ConstraintViolation].
    ConstraintViolation,
    /// See [Error::DuplicateName].
    DuplicateName,
    /// See [Error::NotFound].
    NotFound,
    /// The storage engine failed, see [Error::SqlError] and
    /// [Error::DatabaseLockError].
    Storage,
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Error::DuplicateName(_) => ErrorKind::DuplicateName,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::SqlError(_) | Error::DatabaseLockError => ErrorKind::Storage,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_CHECK,
                },
                description,
            ) => Error::ConstraintViolation(
                description.unwrap_or_else(|| "CHECK constraint failed".to_owned()),
            ),
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
