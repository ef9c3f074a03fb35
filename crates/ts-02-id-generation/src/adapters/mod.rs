//! # Adapters Module
//!
//! - [`InMemoryCoordinator`]: in-process coordination service.

pub mod in_memory;

pub use in_memory::InMemoryCoordinator;
