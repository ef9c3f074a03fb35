//! # TS-04 Transactions
//!
//! Shard resources and a best-effort one-phase-commit coordinator.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Group writes to several physical tables under one commit:
//! - [`ShardResource`] owns one pooled connection and its local transaction
//! - [`Transaction`] enlists resources once per physical table and commits
//!   them in enlistment order
//! - [`TransactionCoordinator`] runs statements in autocommit or
//!   transactional mode
//!
//! ## Guarantees
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | First resource fails to commit | everything rolled back, [`TransactionError::CommitFailed`] |
//! | Resource `k > 0` fails to commit | `0..k` stay committed, [`TransactionError::PartialCommit`] |
//! | Rollback-only or timed out | everything rolled back before any commit |
//!
//! There is no prepare phase and committed resources are never compensated.
//!
//! ## Module Structure
//!
//! ```text
//! ts-04-transactions/
//! ├── domain/          # TransactionId, TransactionState, errors
//! ├── algorithms/      # One-phase commit (Transaction)
//! ├── ports/           # TransactionalResource
//! ├── adapters/        # ShardResource
//! ├── config.rs        # TransactionConfig
//! └── service.rs       # TransactionCoordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::ShardResource;
pub use algorithms::Transaction;
pub use config::TransactionConfig;
pub use domain::{TransactionError, TransactionId, TransactionState};
pub use ports::TransactionalResource;
pub use service::TransactionCoordinator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
