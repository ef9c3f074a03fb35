//! # Error Types
//!
//! Errors raised by the physical store ports and the metadata registry.

use thiserror::Error;

/// Errors from a physical store connection or pool.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The pool could not hand out a connection.
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(String),

    /// The pool was closed at shutdown.
    #[error("Pool closed: {0}")]
    PoolClosed(String),

    /// Insert collided with an existing primary key.
    #[error("Duplicate primary key {pk} in {table}")]
    DuplicateKey { table: String, pk: String },

    /// A written row lacks its primary key column.
    #[error("Missing primary key field {field} in {table}")]
    MissingPrimaryKey { table: String, field: String },

    /// The local transaction failed to commit.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// The local transaction failed to roll back.
    #[error("Rollback failed: {0}")]
    RollbackFailed(String),

    /// Statement execution failed.
    #[error("Statement failed: {0}")]
    Execution(String),

    /// The store returned an outcome of the wrong shape.
    #[error("Unexpected outcome: expected {expected}")]
    UnexpectedOutcome { expected: &'static str },
}

/// Errors from the entity metadata registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// No descriptor registered under this name.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// A descriptor with this name already exists.
    #[error("Entity already registered: {0}")]
    DuplicateEntity(String),

    /// The descriptor is malformed.
    #[error("Invalid entity {entity}: {reason}")]
    Invalid { entity: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_error() {
        let err = StoreError::DuplicateKey {
            table: "user_1".to_string(),
            pk: "42".to_string(),
        };
        assert!(err.to_string().contains("user_1"));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_unknown_entity_error() {
        let err = MetadataError::UnknownEntity("order".to_string());
        assert!(err.to_string().contains("order"));
    }
}
