//! # Domain Errors
//!
//! Cache errors are soft: callers log them and fall back to the store.

use thiserror::Error;

/// Cache error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The cache backend cannot be reached.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A payload could not be encoded or decoded.
    #[error("Cache codec error: {0}")]
    Codec(String),

    /// Invalid configuration.
    #[error("Invalid cache config: {0}")]
    InvalidConfig(String),
}

impl From<bincode::Error> for CacheError {
    fn from(e: bincode::Error) -> Self {
        CacheError::Codec(e.to_string())
    }
}
