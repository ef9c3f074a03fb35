//! # TS-06 Data Layer
//!
//! Sharded storage facade.
//!
//! **Subsystem ID:** 6
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! One entry point for entity persistence across every shard:
//! - Writes route to the master of the key's shard, in autocommit or
//!   enlisted into a caller's [`Transaction`](ts_04_transactions::Transaction)
//! - Reads go through the row cache (L1) or query cache (L2), with a
//!   slave-to-master fallback for empty slave results
//! - Every store call is timed by the [`SlowQueryLog`]
//! - Whole-entity batch work goes to the task executor
//!
//! ## Module Structure
//!
//! ```text
//! ts-06-data-layer/
//! ├── domain/          # EntityKey, QueryKind, DataLayerError
//! ├── config.rs        # StorageConfig, SlowQueryThresholds
//! ├── slow_query.rs    # SlowQueryLog
//! ├── metrics.rs       # Prometheus metrics (feature "metrics")
//! ├── builder.rs       # StorageBuilder
//! └── service.rs       # ShardedStorage
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod service;
pub mod slow_query;

// Re-exports
pub use builder::StorageBuilder;
pub use config::{SlowQueryThresholds, StorageConfig};
pub use domain::{DataLayerError, EntityKey, QueryKind};
pub use service::ShardedStorage;
pub use slow_query::SlowQueryLog;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
