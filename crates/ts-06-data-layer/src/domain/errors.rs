//! # Domain Errors
//!
//! Every subsystem error the facade can surface. Cache errors are absent:
//! they are logged and the call falls back to the store.

use shared_types::{MetadataError, StoreError};
use thiserror::Error;
use ts_01_routing::RoutingError;
use ts_02_id_generation::IdGenerationError;
use ts_04_transactions::TransactionError;
use ts_05_task_executor::TaskError;

/// Data layer error types.
#[derive(Debug, Error)]
pub enum DataLayerError {
    /// Entity lookup failed.
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Routing failed.
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Id allocation failed.
    #[error("Id generation error: {0}")]
    IdGeneration(#[from] IdGenerationError),

    /// Resource or commit failure.
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Statement failure on a single resource.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Task executor failure.
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// The entity key does not match the entity's sharding mode or cluster.
    #[error("Key mismatch for entity {entity}: {reason}")]
    KeyMismatch {
        /// Entity name
        entity: String,
        /// What did not match
        reason: String,
    },

    /// The row carries no usable primary key.
    #[error("Entity {entity} row has no primary key {field}")]
    MissingPrimaryKey {
        /// Entity name
        entity: String,
        /// Primary key column
        field: String,
    },

    /// Invalid configuration.
    #[error("Invalid storage config: {0}")]
    InvalidConfig(String),
}

impl DataLayerError {
    /// Enlistment indices that stayed committed, for partial commits.
    pub fn committed_indices(&self) -> &[usize] {
        match self {
            DataLayerError::Transaction(err) => err.committed_indices(),
            _ => &[],
        }
    }

    /// Unwrap transaction-wrapped store errors so a single-resource store
    /// failure is reported as `Store`.
    pub(crate) fn flatten(err: TransactionError) -> Self {
        match err {
            TransactionError::Store(store) => DataLayerError::Store(store),
            TransactionError::Routing(routing) => DataLayerError::Routing(routing),
            other => DataLayerError::Transaction(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_single_resource_failure() {
        let err = DataLayerError::flatten(TransactionError::Store(StoreError::ConnectionUnavailable(
            "db0".to_string(),
        )));
        assert!(matches!(err, DataLayerError::Store(_)));
        assert!(err.committed_indices().is_empty());
    }
}
