//! Shared error mapping and row conversion for the Diesel repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// What a Diesel failure means to a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    /// The connection dropped.
    Connection,
    /// A referenced row is missing.
    ForeignKey,
    /// A unique constraint rejected the write.
    Unique,
    /// A check constraint rejected the write.
    Check,
    /// Anything else.
    Query,
}

/// Classify `error`, logging the database detail at debug level.
pub(crate) fn classify(error: &DieselError) -> Failure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), constraint = ?info.constraint_name(), "diesel operation failed");
            match kind {
                DatabaseErrorKind::ClosedConnection => Failure::Connection,
                DatabaseErrorKind::ForeignKeyViolation => Failure::ForeignKey,
                DatabaseErrorKind::UniqueViolation => Failure::Unique,
                DatabaseErrorKind::CheckViolation => Failure::Check,
                _ => Failure::Query,
            }
        }
        other => {
            debug!(
                error_type = %std::any::type_name_of_val(other),
                "diesel operation failed"
            );
            Failure::Query
        }
    }
}

/// Map a Diesel error onto a port error via its `connection`/`query`
/// constructors; constraint failures fall back to `query`.
pub(crate) fn map_basic<E>(
    error: &DieselError,
    connection: impl FnOnce(String) -> E,
    query: impl FnOnce(String) -> E,
) -> E {
    match classify(error) {
        Failure::Connection => connection("database connection error".to_owned()),
        _ => query("database error".to_owned()),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::db_error;
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(db_error(DatabaseErrorKind::ClosedConnection), Failure::Connection)]
    #[case(db_error(DatabaseErrorKind::ForeignKeyViolation), Failure::ForeignKey)]
    #[case(db_error(DatabaseErrorKind::UniqueViolation), Failure::Unique)]
    #[case(db_error(DatabaseErrorKind::CheckViolation), Failure::Check)]
    #[case(DieselError::NotFound, Failure::Query)]
    fn classifies_database_errors(#[case] error: DieselError, #[case] expected: Failure) {
        assert_eq!(classify(&error), expected);
    }

    #[rstest]
    fn pool_messages_are_unwrapped() {
        assert_eq!(pool_message(PoolError::checkout("timed out")), "timed out");
    }
}
