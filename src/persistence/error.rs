//! This module contains the error types for the persistence layer.

use thiserror::Error;

/// Errors that can occur in the persistence layer.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// A general error occurred during a data store operation.
    #[error("A data store operation failed: {0}")]
    OperationFailed(#[from] sqlx::Error),

    /// An error occurred during a database migration.
    #[error("A data migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}
