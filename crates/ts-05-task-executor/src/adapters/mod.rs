//! # Adapters Module
//!
//! - [`ShardSource`]: [`RecordSource`](crate::ports::RecordSource) over one routed table

pub mod shard_source;

pub use shard_source::ShardSource;
