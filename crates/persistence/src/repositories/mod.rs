//! Repository implementations for database operations.

pub mod directory;
pub mod lease;
pub mod notification;

pub use directory::DirectoryRepository;
pub use lease::LeaseRepository;
pub use notification::NotificationRepository;

use domain::services::StoreError;

/// Map a sqlx error onto the store error surface.
pub(crate) fn store_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => StoreError::Conflict(db.message().to_string()),
            Some("23503") => StoreError::NotFound(db.message().to_string()),
            _ => StoreError::Database(err.to_string()),
        },
        _ => StoreError::Database(err.to_string()),
    }
}
