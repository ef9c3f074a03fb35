//! # Algorithms Module
//!
//! Sharding hash and route resolution.

pub mod hash;
pub mod router;

pub use hash::{hash_bytes, sharding_hash};
pub use router::ShardRouter;
