//! # TS-03 Cache
//!
//! Two-level, best-effort cache in front of the shard stores.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Levels
//!
//! | Level | Holds | Key |
//! |-------|-------|-----|
//! | L1 [`PrimaryCache`] | rows, row counts | scope + primary key |
//! | L2 [`SecondCache`] | query results | generation + scope + normalized predicate |
//!
//! Writers invalidate rather than overwrite. Cache errors are soft: callers
//! log them and read through to the store.
//!
//! ## Module Structure
//!
//! ```text
//! ts-03-cache/
//! ├── domain/          # CacheScope, key layout, CacheError
//! ├── ports/           # PrimaryCache, SecondCache, CacheTransport
//! ├── adapters/        # InMemoryCacheTransport, transport-backed caches
//! └── config.rs        # CacheConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{CacheStats, InMemoryCacheTransport, TransportPrimaryCache, TransportSecondCache};
pub use config::CacheConfig;
pub use domain::{CacheError, CacheScope};
pub use ports::{CacheTransport, PrimaryCache, QueryLookup, SecondCache};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
