//! # Domain Errors

use shared_types::StoreError;
use thiserror::Error;
use ts_01_routing::RoutingError;
use ts_04_transactions::TransactionError;

/// Task executor error types.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// Store failure while scanning.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Connection or resource failure while scanning.
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Shard enumeration failed.
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Row without an integer primary key.
    #[error("Row in {source_name} has no integer primary key {field}")]
    NonIntegerKey {
        /// Record source
        source_name: String,
        /// Primary key column
        field: String,
    },

    /// `RecordTask::init` failed; nothing was scheduled.
    #[error("Task init failed: {0}")]
    Init(String),

    /// A batch failed inside `RecordTask::process_batch`.
    #[error("Batch failed: {0}")]
    Batch(String),

    /// The worker pool could not be built.
    #[error("Worker pool error: {0}")]
    Pool(String),

    /// Invalid configuration.
    #[error("Invalid executor config: {0}")]
    InvalidConfig(String),
}
