//! # Cache Configuration

use crate::domain::CacheError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum number of entries in the in-memory transport.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum entries held by the in-memory transport.
    pub capacity: usize,
    /// Expiry of cached rows; `None` keeps them until evicted.
    pub row_ttl: Option<Duration>,
    /// Expiry of cached query results.
    pub query_ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            row_ttl: Some(Duration::from_secs(3600)),
            query_ttl: Some(Duration::from_secs(300)),
        }
    }
}

impl CacheConfig {
    /// Builder-style method to set the capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style method to set the row expiry.
    pub fn with_row_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.row_ttl = ttl;
        self
    }

    /// Builder-style method to set the query-result expiry.
    pub fn with_query_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.query_ttl = ttl;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig("capacity must be at least 1".to_string()));
        }
        if self.row_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(CacheError::InvalidConfig("row_ttl must be positive".to_string()));
        }
        if self.query_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(CacheError::InvalidConfig("query_ttl must be positive".to_string()));
        }
        Ok(())
    }
}
