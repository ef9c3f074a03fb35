//! # Store Adapters
//!
//! - [`MemoryStore`]: in-process physical database behind the store ports.

mod memory_store;

pub use memory_store::{MemoryConnection, MemoryPool, MemoryStore};
