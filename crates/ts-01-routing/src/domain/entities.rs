//! # Domain Entities
//!
//! Endpoints, regions and cluster topologies.
//!
//! All of these are created at startup and shared read-only (`Arc`) for the
//! life of the process. The only late-bound state is the connection pool of
//! an endpoint, which is set exactly once.

use super::errors::{RoutingError, TopologyError};
use super::invariants::invariant_regions_partition;
use shared_types::ConnectionPool;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Connection descriptor of one physical database.
pub struct DbEndpoint {
    /// Logical endpoint name, unique inside the topology.
    pub name: String,
    /// Connection URL handed to the pool factory.
    pub url: String,
    /// Physical database name.
    pub database: String,
    pool: OnceLock<Arc<dyn ConnectionPool>>,
}

impl DbEndpoint {
    /// Create an endpoint without a pool.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        database: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            url: url.into(),
            database: database.into(),
            pool: OnceLock::new(),
        })
    }

    /// Create an endpoint with its pool already bound.
    pub fn with_pool(
        name: impl Into<String>,
        url: impl Into<String>,
        pool: Arc<dyn ConnectionPool>,
    ) -> Arc<Self> {
        let database = pool.database_name().to_string();
        let endpoint = Self {
            name: name.into(),
            url: url.into(),
            database,
            pool: OnceLock::new(),
        };
        let _ = endpoint.pool.set(pool);
        Arc::new(endpoint)
    }

    /// Bind the connection pool. Fails if one is already bound.
    pub fn bind_pool(&self, pool: Arc<dyn ConnectionPool>) -> Result<(), TopologyError> {
        self.pool
            .set(pool)
            .map_err(|_| TopologyError::PoolAlreadyBound(self.name.clone()))
    }

    /// Bound connection pool.
    pub fn pool(&self) -> Result<Arc<dyn ConnectionPool>, RoutingError> {
        self.pool
            .get()
            .cloned()
            .ok_or_else(|| RoutingError::PoolNotBound(self.name.clone()))
    }

    /// Close the bound pool, if any.
    pub fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close();
            debug!(endpoint = %self.name, "[topology] endpoint pool closed");
        }
    }
}

impl fmt::Debug for DbEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbEndpoint")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("database", &self.database)
            .field("pool_bound", &self.pool.get().is_some())
            .finish()
    }
}

/// A contiguous slice `[start, end)` of a cluster's hash space.
#[derive(Clone, Debug)]
pub struct Region {
    /// Inclusive start.
    pub start: u64,
    /// Exclusive end.
    pub end: u64,
    /// Master endpoints, in routing order.
    pub masters: Vec<Arc<DbEndpoint>>,
    /// One ordered endpoint list per slave index.
    pub slaves: Vec<Vec<Arc<DbEndpoint>>>,
}

impl Region {
    /// Create a region with master endpoints only.
    pub fn new(start: u64, end: u64, masters: Vec<Arc<DbEndpoint>>) -> Self {
        Self {
            start,
            end,
            masters,
            slaves: Vec::new(),
        }
    }

    /// Builder-style method to append a slave list.
    pub fn with_slaves(mut self, slaves: Vec<Arc<DbEndpoint>>) -> Self {
        self.slaves.push(slaves);
        self
    }

    /// Check whether the region covers `hash`.
    pub fn contains(&self, hash: u64) -> bool {
        self.start <= hash && hash < self.end
    }
}

/// Immutable topology of one cluster.
#[derive(Debug)]
pub struct ClusterTopology {
    name: String,
    master_global: Option<Arc<DbEndpoint>>,
    slave_globals: Vec<Arc<DbEndpoint>>,
    regions: Vec<Region>,
    capacity: u64,
}

impl ClusterTopology {
    /// Start building a cluster.
    pub fn builder(name: impl Into<String>) -> ClusterBuilder {
        ClusterBuilder {
            name: name.into(),
            master_global: None,
            slave_globals: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Cluster name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Master endpoint for global tables.
    pub fn master_global(&self) -> Option<&Arc<DbEndpoint>> {
        self.master_global.as_ref()
    }

    /// Slave endpoints for global tables.
    pub fn slave_globals(&self) -> &[Arc<DbEndpoint>] {
        &self.slave_globals
    }

    /// Regions ordered by range start.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Size of the hash space (end of the last region).
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Every endpoint referenced by this cluster, globals first.
    pub fn endpoints(&self) -> Vec<Arc<DbEndpoint>> {
        let mut out: Vec<Arc<DbEndpoint>> = Vec::new();
        let mut push = |ep: &Arc<DbEndpoint>| {
            if !out.iter().any(|seen| Arc::ptr_eq(seen, ep)) {
                out.push(Arc::clone(ep));
            }
        };
        if let Some(ep) = &self.master_global {
            push(ep);
        }
        self.slave_globals.iter().for_each(&mut push);
        for region in &self.regions {
            region.masters.iter().for_each(&mut push);
            region.slaves.iter().flatten().for_each(&mut push);
        }
        out
    }
}

/// Builder for [`ClusterTopology`]. Validation happens in [`ClusterBuilder::build`].
#[derive(Debug)]
pub struct ClusterBuilder {
    name: String,
    master_global: Option<Arc<DbEndpoint>>,
    slave_globals: Vec<Arc<DbEndpoint>>,
    regions: Vec<Region>,
}

impl ClusterBuilder {
    /// Set the master global endpoint.
    pub fn master_global(mut self, endpoint: Arc<DbEndpoint>) -> Self {
        self.master_global = Some(endpoint);
        self
    }

    /// Append a slave global endpoint.
    pub fn slave_global(mut self, endpoint: Arc<DbEndpoint>) -> Self {
        self.slave_globals.push(endpoint);
        self
    }

    /// Append a region.
    pub fn region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    /// Validate and freeze the cluster.
    pub fn build(mut self) -> Result<ClusterTopology, TopologyError> {
        if self.name.trim().is_empty() {
            return Err(TopologyError::EmptyClusterName);
        }
        self.regions.sort_by_key(|r| r.start);
        invariant_regions_partition(&self.name, &self.regions)?;

        let capacity = self.regions.last().map(|r| r.end).unwrap_or(0);
        Ok(ClusterTopology {
            name: self.name,
            master_global: self.master_global,
            slave_globals: self.slave_globals,
            regions: self.regions,
            capacity,
        })
    }
}

/// All clusters known to the process.
#[derive(Debug, Default)]
pub struct Topology {
    clusters: HashMap<String, Arc<ClusterTopology>>,
}

impl Topology {
    /// Look up a cluster.
    pub fn cluster(&self, name: &str) -> Result<&Arc<ClusterTopology>, RoutingError> {
        self.clusters
            .get(name)
            .ok_or_else(|| RoutingError::UnknownCluster(name.to_string()))
    }

    /// Iterate clusters in no particular order.
    pub fn clusters(&self) -> impl Iterator<Item = &Arc<ClusterTopology>> {
        self.clusters.values()
    }

    /// Close every endpoint pool of every cluster.
    pub fn shutdown(&self) {
        for cluster in self.clusters.values() {
            for endpoint in cluster.endpoints() {
                endpoint.close();
            }
            info!(cluster = %cluster.name(), "[topology] cluster shut down");
        }
    }
}

/// Builder for [`Topology`].
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    clusters: Vec<ClusterTopology>,
}

impl TopologyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validated cluster.
    pub fn cluster(mut self, cluster: ClusterTopology) -> Self {
        self.clusters.push(cluster);
        self
    }

    /// Freeze the topology. Cluster names must be unique.
    pub fn build(self) -> Result<Topology, TopologyError> {
        let mut clusters = HashMap::with_capacity(self.clusters.len());
        for cluster in self.clusters {
            if clusters.contains_key(cluster.name()) {
                return Err(TopologyError::DuplicateCluster(cluster.name().to_string()));
            }
            info!(
                cluster = %cluster.name(),
                regions = cluster.regions().len(),
                capacity = cluster.capacity(),
                "[topology] cluster started"
            );
            clusters.insert(cluster.name().to_string(), Arc::new(cluster));
        }
        Ok(Topology { clusters })
    }
}
