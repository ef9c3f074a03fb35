//! # Adapters Module
//!
//! - [`InMemoryCacheTransport`]: LRU byte store with TTL
//! - [`TransportPrimaryCache`], [`TransportSecondCache`]: cache contracts over a transport

pub mod in_memory;
pub mod transport_cache;

pub use in_memory::{CacheStats, InMemoryCacheTransport};
pub use transport_cache::{TransportPrimaryCache, TransportSecondCache};
