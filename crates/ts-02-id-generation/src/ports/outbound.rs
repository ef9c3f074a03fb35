//! # Outbound Ports
//!
//! Minimal interface to a hierarchical coordination service holding
//! versioned nodes and named mutexes.

use crate::domain::{CoordinationError, MutexLease};
use std::time::Duration;

/// Coordination service - outbound port.
pub trait CoordinationClient: Send + Sync {
    /// Create the node with `data` unless it exists. Returns `true` if created.
    fn create_if_absent(&self, path: &str, data: &[u8]) -> Result<bool, CoordinationError>;

    /// Read node data and its version.
    fn read(&self, path: &str) -> Result<(Vec<u8>, u64), CoordinationError>;

    /// Overwrite node data if its version is still `version`.
    fn write_if_version(
        &self,
        path: &str,
        data: &[u8],
        version: u64,
    ) -> Result<(), CoordinationError>;

    /// Acquire the mutex at `path`, waiting at most `timeout`.
    fn acquire_mutex(&self, path: &str, timeout: Duration) -> Result<MutexLease, CoordinationError>;

    /// Release a held mutex.
    fn release_mutex(&self, lease: MutexLease) -> Result<(), CoordinationError>;
}
