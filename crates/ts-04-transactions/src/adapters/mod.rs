//! # Adapters Module
//!
//! - [`ShardResource`]: connection-backed [`TransactionalResource`](crate::ports::TransactionalResource)

pub mod shard_resource;

pub use shard_resource::ShardResource;
