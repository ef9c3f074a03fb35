//! # Test Fixtures
//!
//! Cluster `c1` over capacity 100:
//!
//! ```text
//! region 0  [0, 50)    master db0   slave db0_s
//! region 1  [50, 100)  master db1   slave db1_s
//! global               master global
//! ```
//!
//! Entities: `user` (4 tables per shard), `audit` (2 tables, not cacheable)
//! and the global `country`.

use shared_types::{EntityDescriptor, MemoryStore, MetadataRegistry, ShardingKey};
use std::sync::{Arc, OnceLock};
use tessera_telemetry::{init_tracing, TelemetryConfig, TracingGuard};
use ts_01_routing::{ClusterTopology, DbEndpoint, Region, Topology, TopologyBuilder};
use ts_02_id_generation::InMemoryCoordinator;
use ts_03_cache::{CacheTransport, InMemoryCacheTransport};
use ts_06_data_layer::{EntityKey, ShardedStorage, StorageBuilder, StorageConfig};

/// Cluster name used by every scenario.
pub const CLUSTER: &str = "c1";

/// Backing stores of the fixture cluster.
pub struct Stores {
    /// Region masters, by region index.
    pub masters: Vec<MemoryStore>,
    /// Region slaves, by region index.
    pub slaves: Vec<MemoryStore>,
    /// Global master.
    pub global: MemoryStore,
}

/// A storage facade wired over the fixture cluster.
pub struct Harness {
    /// The facade.
    pub storage: ShardedStorage,
    /// Backing stores.
    pub stores: Stores,
    /// Shared coordination service.
    pub coordinator: Arc<InMemoryCoordinator>,
    /// Cache transport behind both cache levels.
    pub transport: Arc<InMemoryCacheTransport>,
}

/// Build the two-region topology and its stores.
pub fn topology() -> (Arc<Topology>, Stores) {
    let stores = Stores {
        masters: vec![MemoryStore::new("db0"), MemoryStore::new("db1")],
        slaves: vec![MemoryStore::new("db0_s"), MemoryStore::new("db1_s")],
        global: MemoryStore::new("global"),
    };

    let region = |i: usize, start: u64, end: u64| {
        Region::new(
            start,
            end,
            vec![DbEndpoint::with_pool(
                format!("m{}", i),
                format!("mem://m{}", i),
                stores.masters[i].pool(),
            )],
        )
        .with_slaves(vec![DbEndpoint::with_pool(
            format!("s{}", i),
            format!("mem://s{}", i),
            stores.slaves[i].pool(),
        )])
    };

    let cluster = ClusterTopology::builder(CLUSTER)
        .master_global(DbEndpoint::with_pool(
            "g",
            "mem://g",
            stores.global.pool(),
        ))
        .region(region(0, 0, 50))
        .region(region(1, 50, 100))
        .build()
        .expect("fixture cluster is valid");
    let topology = TopologyBuilder::new()
        .cluster(cluster)
        .build()
        .expect("fixture topology is valid");
    (Arc::new(topology), stores)
}

/// Registry with the fixture entities.
pub fn registry() -> Arc<MetadataRegistry> {
    let mut registry = MetadataRegistry::new();
    registry
        .register(EntityDescriptor::sharded("user", CLUSTER, 4))
        .expect("user descriptor");
    registry
        .register(EntityDescriptor::sharded("audit", CLUSTER, 2).with_cacheable(false))
        .expect("audit descriptor");
    registry
        .register(EntityDescriptor::global("country", CLUSTER))
        .expect("country descriptor");
    Arc::new(registry)
}

static TRACING: OnceLock<Option<TracingGuard>> = OnceLock::new();

/// Install the log subscriber once per test binary.
///
/// Logs at `error` unless `TESSERA_LOG_LEVEL` or `RUST_LOG` say otherwise.
pub fn init_logging() {
    TRACING.get_or_init(|| {
        let mut config = TelemetryConfig::from_env();
        if std::env::var("TESSERA_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
            config = config.with_log_level("error");
        }
        init_tracing(&config).ok()
    });
}

/// Facade with both cache levels over an in-memory transport.
pub fn harness() -> Harness {
    init_logging();
    let (topology, stores) = topology();
    let coordinator = Arc::new(InMemoryCoordinator::new());
    let transport = Arc::new(InMemoryCacheTransport::new(10_000));
    let storage = StorageBuilder::new(
        topology,
        registry(),
        Arc::clone(&coordinator) as Arc<dyn ts_02_id_generation::CoordinationClient>,
    )
    .with_config(StorageConfig::for_testing())
    .with_cache_transport(Arc::clone(&transport) as Arc<dyn CacheTransport>)
    .build()
    .expect("fixture storage builds");

    Harness {
        storage,
        stores,
        coordinator,
        transport,
    }
}

/// Sharding key in the fixture cluster.
pub fn key(value: i64) -> EntityKey {
    EntityKey::Sharded(ShardingKey::new(CLUSTER, value))
}
