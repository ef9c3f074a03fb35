//! # Domain Errors
//!
//! Error types for id generation and the coordination port.

use thiserror::Error;

/// Errors from the coordination service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    /// The service cannot be reached.
    #[error("Coordination service unavailable: {0}")]
    Unavailable(String),

    /// The node does not exist.
    #[error("No such node: {0}")]
    NoNode(String),

    /// A conditional write lost the race.
    #[error("Version conflict on {path}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Node path
        path: String,
        /// Version the write was conditioned on
        expected: u64,
        /// Current version
        actual: u64,
    },

    /// The mutex was not acquired in time.
    #[error("Timed out acquiring mutex {0}")]
    LockTimeout(String),

    /// The lease is not held (already released or never granted).
    #[error("Lease not held on {0}")]
    InvalidLease(String),

    /// The node holds data that is not a counter.
    #[error("Corrupt counter at {path}: {reason}")]
    Corrupt {
        /// Node path
        path: String,
        /// What went wrong
        reason: String,
    },
}

impl CoordinationError {
    /// Transient errors are retried with backoff; the rest surface at once.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoordinationError::Unavailable(_)
                | CoordinationError::VersionConflict { .. }
                | CoordinationError::LockTimeout(_)
        )
    }
}

/// Errors from the id generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdGenerationError {
    /// Batch size must be at least 1.
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// Every attempt failed with a transient coordination error.
    #[error("Id allocation for {key} failed after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Counter key
        key: String,
        /// Attempts made
        attempts: u32,
        /// Last transient error
        last_error: CoordinationError,
    },

    /// Every attempt produced a batch containing id 0.
    #[error("Id allocation for {key} kept producing 0 after {attempts} attempts")]
    ZeroId {
        /// Counter key
        key: String,
        /// Attempts made
        attempts: u32,
    },

    /// Non-transient coordination failure.
    #[error("Coordination error: {0}")]
    Coordination(#[from] CoordinationError),

    /// Invalid configuration.
    #[error("Invalid id generator config: {0}")]
    InvalidConfig(String),
}
