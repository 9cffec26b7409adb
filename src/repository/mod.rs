//! Repository layer for database operations

pub mod activity_logs;
pub mod equipment;
pub mod loans;
pub mod returns;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub equipment: equipment::EquipmentRepository,
    pub loans: loans::LoansRepository,
    pub returns: returns::ReturnsRepository,
    pub activity_logs: activity_logs::ActivityLogsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            activity_logs: activity_logs::ActivityLogsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Turns a unique-constraint violation into a `Conflict`, anything else into a database error
pub(crate) fn conflict_on_unique(error: sqlx::Error, message: impl Into<String>) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message.into()),
        _ => AppError::Database(error),
    }
}

/// Turns a foreign-key violation into a `Conflict`, anything else into a database error
pub(crate) fn conflict_on_foreign_key(error: sqlx::Error, message: impl Into<String>) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Conflict(message.into())
        }
        _ => AppError::Database(error),
    }
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, error::Error as StdError, fmt};

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct FakeDbError(ErrorKind);

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint violated")
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn db_error(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError(kind)))
    }

    #[test]
    fn test_foreign_key_violation_is_conflict() {
        let err = conflict_on_foreign_key(db_error(ErrorKind::ForeignKeyViolation), "in use");
        assert!(matches!(err, AppError::Conflict(ref m) if m == "in use"));

        let err = conflict_on_foreign_key(db_error(ErrorKind::UniqueViolation), "in use");
        assert!(matches!(err, AppError::Database(_)));
        assert!(matches!(
            conflict_on_foreign_key(sqlx::Error::RowNotFound, "in use"),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = conflict_on_unique(db_error(ErrorKind::UniqueViolation), "taken");
        assert!(matches!(err, AppError::Conflict(_)));
        let err = conflict_on_unique(db_error(ErrorKind::ForeignKeyViolation), "taken");
        assert!(matches!(err, AppError::Database(_)));
    }
}
