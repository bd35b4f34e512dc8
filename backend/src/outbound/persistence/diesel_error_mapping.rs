//! Shared classification of Diesel and unit-of-work failures.
//!
//! Repositories translate a [`StoreFailure`] into their own port error; the
//! classification of database error kinds lives here once.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::unit_of_work::UnitOfWorkError;

/// Storage failure category shared by all Diesel repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// A unique constraint rejected the write.
    Unique(String),
    /// A foreign key constraint rejected the write or delete.
    ForeignKey(String),
    /// The database could not be reached.
    Connection(String),
    /// Any other query failure.
    Query(String),
}

fn constraint_message(info: &dyn diesel::result::DatabaseErrorInformation) -> String {
    info.details().unwrap_or_else(|| info.message()).to_owned()
}

/// Classify a Diesel error.
pub(crate) fn classify_diesel_error(error: DieselError) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreFailure::Unique(constraint_message(info.as_ref()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreFailure::ForeignKey(constraint_message(info.as_ref()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            StoreFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => StoreFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => StoreFailure::Query("database query error".to_owned()),
        DieselError::DatabaseError(_, info) => StoreFailure::Query(info.message().to_owned()),
        _ => StoreFailure::Query("database error".to_owned()),
    }
}

/// Classify a failure raised by the unit of work.
pub(crate) fn classify_unit_of_work_error(error: UnitOfWorkError) -> StoreFailure {
    match error {
        UnitOfWorkError::Pool(err) => StoreFailure::Connection(err.to_string()),
        UnitOfWorkError::Begin(err) | UnitOfWorkError::Commit(err) => classify_diesel_error(err),
    }
}
