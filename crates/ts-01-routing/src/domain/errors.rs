//! # Domain Errors
//!
//! Error types for the routing subsystem.

use thiserror::Error;

/// Errors raised while resolving a route.
///
/// Routing errors are fatal for the calling operation and always surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No cluster registered under this name.
    #[error("Unknown cluster: {0}")]
    UnknownCluster(String),

    /// Text sharding values must be non-empty.
    #[error("Empty sharding value for cluster {0}")]
    EmptyShardingValue(String),

    /// No region covers the hash.
    #[error("No region in cluster {cluster} covers hash {hash}")]
    NoRegion {
        /// Cluster name
        cluster: String,
        /// Hash after the capacity modulo
        hash: u64,
    },

    /// Table count metadata must be positive for sharded tables.
    #[error("Invalid table count for table {0}: must be at least 1")]
    InvalidTableCount(String),

    /// The requested slave index is not configured.
    #[error("No slave {index} configured in cluster {cluster}")]
    NoSlave {
        /// Cluster name
        cluster: String,
        /// Requested slave index
        index: usize,
    },

    /// The requested global endpoint is not configured.
    #[error("No global endpoint for {target} in cluster {cluster}")]
    NoGlobalEndpoint {
        /// Cluster name
        cluster: String,
        /// Requested target, rendered
        target: String,
    },

    /// The endpoint has no connection pool bound yet.
    #[error("No connection pool bound to endpoint {0}")]
    PoolNotBound(String),
}

/// Errors raised while building a topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Cluster names must be non-empty.
    #[error("Cluster name cannot be empty")]
    EmptyClusterName,

    /// A cluster was registered twice.
    #[error("Duplicate cluster: {0}")]
    DuplicateCluster(String),

    /// A cluster needs at least one region.
    #[error("Cluster {0} has no regions")]
    NoRegions(String),

    /// Region ranges must be non-empty.
    #[error("Region {index} of cluster {cluster} has an empty range [{start}, {end})")]
    EmptyRange {
        /// Cluster name
        cluster: String,
        /// Region index
        index: usize,
        /// Range start
        start: u64,
        /// Range end
        end: u64,
    },

    /// Regions must start at 0 and be contiguous.
    #[error("Region {index} of cluster {cluster} starts at {found}, expected {expected}")]
    RegionGap {
        /// Cluster name
        cluster: String,
        /// Region index
        index: usize,
        /// Expected start (previous end, or 0)
        expected: u64,
        /// Actual start
        found: u64,
    },

    /// Every region needs at least one master endpoint.
    #[error("Region {index} of cluster {cluster} has no master endpoints")]
    NoMasters {
        /// Cluster name
        cluster: String,
        /// Region index
        index: usize,
    },

    /// Slave lists, when present, must be non-empty.
    #[error("Region {index} of cluster {cluster} has an empty slave list {slave}")]
    EmptySlaveList {
        /// Cluster name
        cluster: String,
        /// Region index
        index: usize,
        /// Slave list index
        slave: usize,
    },

    /// A pool was already bound to the endpoint.
    #[error("Connection pool already bound to endpoint {0}")]
    PoolAlreadyBound(String),
}
