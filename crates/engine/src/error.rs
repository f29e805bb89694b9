use thiserror::Error;

use domain::services::StoreError;

/// Engine-level error surface.
///
/// Per-item failures inside batch runs are data (report entries), not
/// variants of this enum; only whole-operation failures propagate here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => EngineError::NotFound(msg),
            StoreError::Conflict(msg) => EngineError::Conflict(msg),
            StoreError::Transaction(msg) => EngineError::Transaction(msg),
            StoreError::Database(msg) => EngineError::Database(msg),
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => EngineError::NotFound(err.to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => EngineError::Conflict(db.message().to_string()),
                Some("23503") => EngineError::NotFound(db.message().to_string()),
                _ => EngineError::Database(err.to_string()),
            },
            _ => EngineError::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        EngineError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err: EngineError = StoreError::Conflict("lease already renewed".into()).into();
        assert!(matches!(err, EngineError::Conflict(_)));

        let err: EngineError = StoreError::NotFound("tenant".into()).into();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: EngineError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_validation_errors_map_to_validation() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("email", validator::ValidationError::new("email"));
        let err: EngineError = errors.into();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
