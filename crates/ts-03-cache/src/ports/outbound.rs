//! # Outbound Ports
//!
//! Byte-level key/value backend behind both cache levels.

use crate::domain::CacheError;
use std::time::Duration;

/// Cache transport - outbound port.
pub trait CacheTransport: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Write a value, optionally expiring after `ttl`.
    fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Add `delta` to a decimal counter.
    ///
    /// Returns `None` when the key is missing. Results are clamped at 0.
    fn incr(&self, key: &str, delta: i64) -> Result<Option<i64>, CacheError>;

    /// Release backend resources.
    fn shutdown(&self) {}
}
