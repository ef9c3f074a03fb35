//! # TS-05 Task Executor
//!
//! Batch processing over every row of an entity.
//!
//! **Subsystem ID:** 5
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Apply a caller-supplied [`RecordTask`] to a whole table set:
//! - [`RecordIterator`] walks one physical table in primary-key windows
//! - [`TaskExecutor`] reads every master shard in parallel on a rayon pool
//! - [`TaskHandle`] reports progress, waits (blocking or async) and cancels
//!
//! ## Module Structure
//!
//! ```text
//! ts-05-task-executor/
//! ├── domain/          # TaskProgress, TaskHandle, errors
//! ├── algorithms/      # RecordIterator
//! ├── ports/           # RecordTask, RecordSource
//! ├── adapters/        # ShardSource
//! ├── config.rs        # ExecutorConfig
//! └── service.rs       # TaskExecutor
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
pub use adapters::ShardSource;
pub use algorithms::{RecordIterator, DEFAULT_STEP};
pub use config::ExecutorConfig;
pub use domain::{TaskError, TaskHandle, TaskProgress};
pub use ports::{RecordSource, RecordTask};
pub use service::TaskExecutor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
