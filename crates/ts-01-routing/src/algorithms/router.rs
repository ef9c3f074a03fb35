//! # Shard Router
//!
//! Deterministic resolution of a sharding key to one physical table.
//!
//! ```text
//! value ──mask/hash──▶ position ──mod capacity──▶ hash
//!   hash ──binary search──▶ region
//!   hash mod endpoints ──▶ endpoint (master list or slave list i)
//!   hash mod table_count ──▶ table index
//! ```
//!
//! The same key, topology and table count always yield the same decision.

use super::hash::sharding_hash;
use crate::config::RouterConfig;
use crate::domain::{
    ClusterTopology, DbEndpoint, ReadTarget, Region, RouteDecision, RoutingError, Topology,
};
use shared_types::ShardingKey;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::trace;

/// Shard router over an immutable topology.
#[derive(Debug, Clone)]
pub struct ShardRouter {
    topology: Arc<Topology>,
    config: RouterConfig,
}

impl ShardRouter {
    /// Create a router.
    pub fn new(topology: Arc<Topology>, config: RouterConfig) -> Self {
        Self { topology, config }
    }

    /// Topology this router resolves against.
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Router configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Resolve a sharded table for `key`.
    pub fn route(
        &self,
        key: &ShardingKey,
        table: &str,
        target: ReadTarget,
        table_count: usize,
    ) -> Result<RouteDecision, RoutingError> {
        let cluster = self.topology.cluster(key.cluster())?;
        if table_count == 0 {
            return Err(RoutingError::InvalidTableCount(table.to_string()));
        }

        let position = sharding_hash(cluster.name(), key.value(), self.config.hash_algorithm)?;
        let hash = position % cluster.capacity();
        let (region_index, region) = locate_region(cluster, hash)?;
        let endpoints = endpoints_for(cluster, region, target)?;
        let endpoint = Arc::clone(&endpoints[(hash % endpoints.len() as u64) as usize]);
        let table_index = (hash % table_count as u64) as usize;

        trace!(
            key = %key,
            hash,
            region = region_index,
            endpoint = %endpoint.name,
            table_index,
            "[router] route resolved"
        );

        Ok(RouteDecision {
            cluster: cluster.name().to_string(),
            region_index: Some(region_index),
            endpoint,
            table: table.to_string(),
            table_index: Some(table_index),
        })
    }

    /// Resolve a global (unsharded) table.
    pub fn route_global(
        &self,
        cluster: &str,
        table: &str,
        target: ReadTarget,
    ) -> Result<RouteDecision, RoutingError> {
        let topology = self.topology.cluster(cluster)?;
        let endpoint = match target {
            ReadTarget::Master => topology.master_global(),
            ReadTarget::Slave(i) => topology.slave_globals().get(i),
        }
        .ok_or_else(|| RoutingError::NoGlobalEndpoint {
            cluster: cluster.to_string(),
            target: target.to_string(),
        })?;

        Ok(RouteDecision {
            cluster: topology.name().to_string(),
            region_index: None,
            endpoint: Arc::clone(endpoint),
            table: table.to_string(),
            table_index: None,
        })
    }

    /// Every (region, master endpoint, table index) of a sharded table.
    pub fn all_master_shards(
        &self,
        cluster: &str,
        table: &str,
        table_count: usize,
    ) -> Result<Vec<RouteDecision>, RoutingError> {
        self.fan_out(cluster, table, table_count, ReadTarget::Master)
    }

    /// Every (region, slave endpoint, table index) of a sharded table for
    /// slave list `slave_index`.
    pub fn all_slave_shards(
        &self,
        cluster: &str,
        table: &str,
        table_count: usize,
        slave_index: usize,
    ) -> Result<Vec<RouteDecision>, RoutingError> {
        self.fan_out(cluster, table, table_count, ReadTarget::Slave(slave_index))
    }

    fn fan_out(
        &self,
        cluster: &str,
        table: &str,
        table_count: usize,
        target: ReadTarget,
    ) -> Result<Vec<RouteDecision>, RoutingError> {
        let topology = self.topology.cluster(cluster)?;
        if table_count == 0 {
            return Err(RoutingError::InvalidTableCount(table.to_string()));
        }

        let mut decisions = Vec::new();
        for (region_index, region) in topology.regions().iter().enumerate() {
            for endpoint in endpoints_for(topology, region, target)? {
                for table_index in 0..table_count {
                    decisions.push(RouteDecision {
                        cluster: topology.name().to_string(),
                        region_index: Some(region_index),
                        endpoint: Arc::clone(endpoint),
                        table: table.to_string(),
                        table_index: Some(table_index),
                    });
                }
            }
        }
        Ok(decisions)
    }
}

/// Binary search for the region covering `hash`.
fn locate_region(cluster: &ClusterTopology, hash: u64) -> Result<(usize, &Region), RoutingError> {
    let regions = cluster.regions();
    regions
        .binary_search_by(|region| {
            if hash < region.start {
                Ordering::Greater
            } else if hash >= region.end {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        })
        .map(|index| (index, &regions[index]))
        .map_err(|_| RoutingError::NoRegion {
            cluster: cluster.name().to_string(),
            hash,
        })
}

/// Endpoint list of a region for the target. Slaves never fall back to the master.
fn endpoints_for<'a>(
    cluster: &ClusterTopology,
    region: &'a Region,
    target: ReadTarget,
) -> Result<&'a [Arc<DbEndpoint>], RoutingError> {
    let endpoints = match target {
        ReadTarget::Master => Some(region.masters.as_slice()),
        ReadTarget::Slave(i) => region.slaves.get(i).map(|list| list.as_slice()),
    };
    match endpoints {
        Some(list) if !list.is_empty() => Ok(list),
        _ => Err(match target {
            ReadTarget::Master => RoutingError::NoRegion {
                cluster: cluster.name().to_string(),
                hash: region.start,
            },
            ReadTarget::Slave(index) => RoutingError::NoSlave {
                cluster: cluster.name().to_string(),
                index,
            },
        }),
    }
}
