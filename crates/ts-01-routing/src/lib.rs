//! # TS-01 Routing
//!
//! Cluster topology and deterministic shard routing.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (domain + algorithms)
//!
//! ## Purpose
//!
//! Resolve a sharding key to one physical table:
//! - Immutable cluster topology (regions over a hash space, master and
//!   slave endpoint lists, global endpoints), validated at build time
//! - Selectable string hash (Bernstein, FNV-1a, Keccak)
//! - Fan-out enumeration of every shard of a table
//!
//! ## Invariants
//!
//! | Rule | Where |
//! |------|-------|
//! | Regions partition `[0, capacity)` | [`invariant_regions_partition`] |
//! | Same key, same topology, same decision | [`ShardRouter::route`] |
//! | No implicit slave-to-master fallback | [`ShardRouter::route`] |
//!
//! ## Module Structure
//!
//! ```text
//! ts-01-routing/
//! ├── domain/          # Topology entities, route decisions, errors, invariants
//! ├── algorithms/      # Sharding hash, router
//! └── config.rs        # RouterConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod config;
pub mod domain;

// Re-exports
pub use algorithms::{hash_bytes, sharding_hash, ShardRouter};
pub use config::RouterConfig;
pub use domain::{
    invariant_regions_partition, ClusterBuilder, ClusterTopology, DbEndpoint, HashAlgorithm,
    ReadTarget, Region, RouteDecision, RoutingError, Topology, TopologyBuilder, TopologyError,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
