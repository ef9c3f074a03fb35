//! # TS-02 Id Generation
//!
//! Cluster-unique, monotonic ids per (cluster, name).
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Hand out ids that never collide across processes:
//! - Counter nodes `/idgen/<cluster>/<name>` in a coordination service
//! - Allocation under a cluster-wide mutex with a version-checked write
//! - Per-process FIFO buffers so most calls never leave the process
//! - Bounded exponential backoff on transient coordination failures
//!
//! ## Module Structure
//!
//! ```text
//! ts-02-id-generation/
//! ├── domain/          # IdKey, MutexLease, errors
//! ├── ports/           # CoordinationClient
//! ├── adapters/        # InMemoryCoordinator
//! ├── config.rs        # IdGeneratorConfig
//! └── service.rs       # IdGenerator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryCoordinator;
pub use config::IdGeneratorConfig;
pub use domain::{CoordinationError, IdGenerationError, IdKey, MutexLease, ID_ROOT};
pub use ports::CoordinationClient;
pub use service::IdGenerator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
