//! # Storage Configuration
//!
//! Aggregates the configuration of every subsystem the facade wires
//! together, plus slow-query thresholds.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Example |
//! |----------|-------|---------|
//! | `TESSERA_ID_BATCH` | `id.batch_size` | `500` |
//! | `TESSERA_HASH_ALGO` | `router.hash_algorithm` | `fnv1a` |
//! | `TESSERA_TASK_THREADS` | `executor.worker_threads` | `8` |
//! | `TESSERA_TX_TIMEOUT_SECS` | `transaction.timeout` (`0` disables) | `60` |

use crate::domain::{DataLayerError, QueryKind};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use ts_01_routing::{HashAlgorithm, RouterConfig};
use ts_02_id_generation::IdGeneratorConfig;
use ts_03_cache::CacheConfig;
use ts_04_transactions::TransactionConfig;
use ts_05_task_executor::ExecutorConfig;

/// Per-kind thresholds above which a store call is logged as slow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowQueryThresholds {
    /// Row counts.
    pub count: Duration,
    /// Single primary-key lookups.
    pub pk: Duration,
    /// Multi primary-key lookups.
    pub pks: Duration,
    /// Predicate queries.
    pub query: Duration,
    /// Writes and iterator windows.
    pub scan: Duration,
}

impl Default for SlowQueryThresholds {
    fn default() -> Self {
        Self {
            count: Duration::from_millis(100),
            pk: Duration::from_millis(50),
            pks: Duration::from_millis(100),
            query: Duration::from_millis(200),
            scan: Duration::from_millis(500),
        }
    }
}

impl SlowQueryThresholds {
    /// Threshold for one kind of call.
    pub fn threshold(&self, kind: QueryKind) -> Duration {
        match kind {
            QueryKind::Count => self.count,
            QueryKind::Pk => self.pk,
            QueryKind::Pks => self.pks,
            QueryKind::Query => self.query,
            QueryKind::Scan => self.scan,
        }
    }

    /// Same threshold for every kind.
    pub fn uniform(threshold: Duration) -> Self {
        Self {
            count: threshold,
            pk: threshold,
            pks: threshold,
            query: threshold,
            scan: threshold,
        }
    }
}

/// Data layer configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Shard router.
    pub router: RouterConfig,
    /// Id generator.
    pub id: IdGeneratorConfig,
    /// Caches built from a transport.
    pub cache: CacheConfig,
    /// Transaction coordinator.
    pub transaction: TransactionConfig,
    /// Task executor.
    pub executor: ExecutorConfig,
    /// Slow-query log.
    pub slow_query: SlowQueryThresholds,
}

impl StorageConfig {
    /// Create a config for testing (fast retries, small pool).
    pub fn for_testing() -> Self {
        Self {
            id: IdGeneratorConfig::for_testing(),
            executor: ExecutorConfig::for_testing(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `TESSERA_*` environment variables.
    pub fn from_env() -> Result<Self, DataLayerError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DataLayerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(batch) = parse_var::<usize, _>(&lookup, "TESSERA_ID_BATCH")? {
            config.id.batch_size = batch;
        }
        if let Some(algo) = lookup("TESSERA_HASH_ALGO") {
            config.router.hash_algorithm = HashAlgorithm::from_str(&algo)
                .map_err(|e| DataLayerError::InvalidConfig(format!("TESSERA_HASH_ALGO: {}", e)))?;
        }
        if let Some(threads) = parse_var::<usize, _>(&lookup, "TESSERA_TASK_THREADS")? {
            config.executor.worker_threads = threads;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "TESSERA_TX_TIMEOUT_SECS")? {
            config.transaction.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the hash algorithm.
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.router.hash_algorithm = algorithm;
        self
    }

    /// Builder-style method to set the slow-query thresholds.
    pub fn with_slow_query(mut self, thresholds: SlowQueryThresholds) -> Self {
        self.slow_query = thresholds;
        self
    }

    /// Builder-style method to set the transaction timeout.
    pub fn with_transaction_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transaction.timeout = timeout;
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), DataLayerError> {
        self.id.validate()?;
        self.cache
            .validate()
            .map_err(|e| DataLayerError::InvalidConfig(e.to_string()))?;
        self.transaction.validate()?;
        self.executor.validate()?;
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, DataLayerError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DataLayerError::InvalidConfig(format!("{} is not a number: {}", name, raw))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = StorageConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StorageConfig::default());
        assert_eq!(config.id.batch_size, 100);
        assert_eq!(config.executor.default_step, 2000);
    }

    #[test]
    fn test_variables_override() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("TESSERA_ID_BATCH", "500"),
            ("TESSERA_HASH_ALGO", "keccak"),
            ("TESSERA_TASK_THREADS", "3"),
            ("TESSERA_TX_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.id.batch_size, 500);
        assert_eq!(config.router.hash_algorithm, HashAlgorithm::Keccak);
        assert_eq!(config.executor.worker_threads, 3);
        assert_eq!(config.transaction.timeout, None);
    }

    #[test]
    fn test_bad_variables_rejected() {
        assert!(matches!(
            StorageConfig::from_lookup(lookup(&[("TESSERA_HASH_ALGO", "md5")])),
            Err(DataLayerError::InvalidConfig(_))
        ));
        assert!(StorageConfig::from_lookup(lookup(&[("TESSERA_ID_BATCH", "lots")])).is_err());
        assert!(StorageConfig::from_lookup(lookup(&[("TESSERA_ID_BATCH", "0")])).is_err());
    }

    #[test]
    fn test_thresholds_by_kind() {
        let t = SlowQueryThresholds::default();
        assert_eq!(t.threshold(QueryKind::Pk), Duration::from_millis(50));
        assert_eq!(
            SlowQueryThresholds::uniform(Duration::ZERO).threshold(QueryKind::Scan),
            Duration::ZERO
        );
    }
}
