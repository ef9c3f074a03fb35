//! # Storage Builder
//!
//! Wires topology, registry, coordination client and optional caches into a
//! [`ShardedStorage`].

use crate::config::StorageConfig;
use crate::domain::DataLayerError;
use crate::service::ShardedStorage;
use crate::slow_query::SlowQueryLog;
use shared_types::MetadataRegistry;
use std::sync::Arc;
use tracing::info;
use ts_01_routing::{ShardRouter, Topology};
use ts_02_id_generation::{CoordinationClient, IdGenerator};
use ts_03_cache::{
    CacheTransport, PrimaryCache, SecondCache, TransportPrimaryCache, TransportSecondCache,
};
use ts_04_transactions::TransactionCoordinator;
use ts_05_task_executor::TaskExecutor;

/// Builder for [`ShardedStorage`].
pub struct StorageBuilder {
    topology: Arc<Topology>,
    registry: Arc<MetadataRegistry>,
    coordination: Arc<dyn CoordinationClient>,
    config: StorageConfig,
    primary: Option<Arc<dyn PrimaryCache>>,
    second: Option<Arc<dyn SecondCache>>,
    transport: Option<Arc<dyn CacheTransport>>,
}

impl StorageBuilder {
    /// Start a builder with default configuration and no caches.
    pub fn new(
        topology: Arc<Topology>,
        registry: Arc<MetadataRegistry>,
        coordination: Arc<dyn CoordinationClient>,
    ) -> Self {
        Self {
            topology,
            registry,
            coordination,
            config: StorageConfig::default(),
            primary: None,
            second: None,
            transport: None,
        }
    }

    /// Builder-style method to set the configuration.
    pub fn with_config(mut self, config: StorageConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder-style method to set the row and count cache.
    pub fn with_primary_cache(mut self, cache: Arc<dyn PrimaryCache>) -> Self {
        self.primary = Some(cache);
        self
    }

    /// Builder-style method to set the query-result cache.
    pub fn with_second_cache(mut self, cache: Arc<dyn SecondCache>) -> Self {
        self.second = Some(cache);
        self
    }

    /// Builder-style method to set a cache transport.
    ///
    /// Cache levels not set explicitly are built over this transport.
    pub fn with_cache_transport(mut self, transport: Arc<dyn CacheTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the configuration and start every component.
    pub fn build(self) -> Result<ShardedStorage, DataLayerError> {
        let config = self.config;
        config.validate()?;

        let router = Arc::new(ShardRouter::new(self.topology, config.router.clone()));
        let ids = Arc::new(IdGenerator::new(self.coordination, config.id.clone())?);
        let coordinator = TransactionCoordinator::new(config.transaction.clone())?;
        let executor = Arc::new(TaskExecutor::new(
            Arc::clone(&router),
            coordinator.clone(),
            config.executor.clone(),
        )?);

        let primary = match (self.primary, &self.transport) {
            (Some(cache), _) => Some(cache),
            (None, Some(transport)) => Some(Arc::new(TransportPrimaryCache::new(
                Arc::clone(transport),
                &config.cache,
            )) as Arc<dyn PrimaryCache>),
            (None, None) => None,
        };
        let second = match (self.second, &self.transport) {
            (Some(cache), _) => Some(cache),
            (None, Some(transport)) => Some(Arc::new(TransportSecondCache::new(
                Arc::clone(transport),
                &config.cache,
            )) as Arc<dyn SecondCache>),
            (None, None) => None,
        };

        info!(
            entities = self.registry.len(),
            l1 = primary.is_some(),
            l2 = second.is_some(),
            hash = ?config.router.hash_algorithm,
            "[data-layer] storage ready"
        );

        Ok(ShardedStorage {
            registry: self.registry,
            router,
            ids,
            primary,
            second,
            cache_transport: self.transport,
            coordinator,
            executor,
            slow_log: SlowQueryLog::new(config.slow_query.clone()),
            config,
        })
    }
}
