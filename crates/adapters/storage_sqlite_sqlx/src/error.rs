//! Storage-specific error type wrapping sqlx errors.

use ordercron_domain::error::OrderCronError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// The order snapshot could not be encoded as JSON.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for OrderCronError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
