//! # Domain Errors
//!
//! Error types for shard resources and the transaction coordinator.

use super::value_objects::{TransactionId, TransactionState};
use shared_types::StoreError;
use thiserror::Error;
use ts_01_routing::RoutingError;

/// Transaction error types.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    /// Store failure on a single resource.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The resource's endpoint could not be resolved.
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// The operation needs an active transaction.
    #[error("Transaction {id} is not active (state {state:?})")]
    NotActive {
        /// Transaction id
        id: TransactionId,
        /// Current state
        state: TransactionState,
    },

    /// The resource was already closed.
    #[error("Resource closed: {0}")]
    ResourceClosed(String),

    /// The first resource failed to commit; nothing was committed.
    #[error("Transaction {id} failed to commit on {resource}: {source}")]
    CommitFailed {
        /// Transaction id
        id: TransactionId,
        /// Failing resource
        resource: String,
        /// Underlying failure
        source: StoreError,
    },

    /// Some resources committed before one failed. Not compensated.
    #[error("Transaction {id} partially committed: {committed:?} committed, {failed} ({resource}) failed: {source}")]
    PartialCommit {
        /// Transaction id
        id: TransactionId,
        /// Enlistment indices that committed
        committed: Vec<usize>,
        /// Enlistment index that failed
        failed: usize,
        /// Failing resource
        resource: String,
        /// Underlying failure
        source: StoreError,
    },

    /// The transaction was marked rollback-only; it was rolled back.
    #[error("Transaction {0} was marked rollback-only and has been rolled back")]
    RollbackOnly(TransactionId),

    /// The transaction outlived its timeout; it was rolled back.
    #[error("Transaction {id} timed out after {elapsed_ms}ms and has been rolled back")]
    Timeout {
        /// Transaction id
        id: TransactionId,
        /// Age of the transaction at commit time
        elapsed_ms: u64,
    },

    /// Invalid configuration.
    #[error("Invalid transaction config: {0}")]
    InvalidConfig(String),
}

impl TransactionError {
    /// Enlistment indices that committed, for partial commits.
    pub fn committed_indices(&self) -> &[usize] {
        match self {
            TransactionError::PartialCommit { committed, .. } => committed,
            _ => &[],
        }
    }
}
