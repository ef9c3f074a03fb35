//! # Transport-Backed Caches
//!
//! [`PrimaryCache`] and [`SecondCache`] over any [`CacheTransport`].
//!
//! Rows are encoded with `bincode`. Counts are stored as decimal text so
//! the transport can increment them in place.
//!
//! ## Query Result Generations
//!
//! Every query key embeds the current generation of its logical table.
//! `invalidate` bumps the generation, which orphans every older result at
//! once; orphans age out through the transport's LRU order or TTL.
//!
//! The counter shares the transport with the results it guards and may be
//! evicted. A missing counter is reseeded from the wall clock, kept above
//! the highest generation this process has seen, so it never falls back to
//! a generation whose results are still cached.

use crate::config::CacheConfig;
use crate::domain::{count_key, generation_key, query_key, row_key, CacheError, CacheScope};
use crate::ports::{CacheTransport, PrimaryCache, QueryLookup, SecondCache};
use shared_types::{PkValue, Query, Row};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::trace;

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, CacheError> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheError> {
    Ok(bincode::deserialize(bytes)?)
}

fn parse_count(key: &str, bytes: &[u8]) -> Result<u64, CacheError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| CacheError::Codec(format!("{} is not a count", key)))
}

/// Row and count cache over a transport.
pub struct TransportPrimaryCache {
    transport: Arc<dyn CacheTransport>,
    row_ttl: Option<Duration>,
}

impl TransportPrimaryCache {
    /// Create a primary cache.
    pub fn new(transport: Arc<dyn CacheTransport>, config: &CacheConfig) -> Self {
        Self {
            transport,
            row_ttl: config.row_ttl,
        }
    }
}

impl PrimaryCache for TransportPrimaryCache {
    fn get(&self, scope: &CacheScope, pk: &PkValue) -> Result<Option<Row>, CacheError> {
        match self.transport.get(&row_key(scope, pk))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, scope: &CacheScope, pk: &PkValue, row: &Row) -> Result<(), CacheError> {
        self.transport
            .put(&row_key(scope, pk), encode(row)?, self.row_ttl)
    }

    fn remove(&self, scope: &CacheScope, pk: &PkValue) -> Result<(), CacheError> {
        self.transport.remove(&row_key(scope, pk))
    }

    fn get_many(&self, scope: &CacheScope, pks: &[PkValue]) -> Result<Vec<Option<Row>>, CacheError> {
        let slots = pks
            .iter()
            .map(|pk| self.get(scope, pk))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(
            scope = %scope,
            requested = pks.len(),
            hits = slots.iter().filter(|s| s.is_some()).count(),
            "[cache] get_many"
        );
        Ok(slots)
    }

    fn put_many(&self, scope: &CacheScope, rows: &[(PkValue, Row)]) -> Result<(), CacheError> {
        for (pk, row) in rows {
            self.put(scope, pk, row)?;
        }
        Ok(())
    }

    fn remove_many(&self, scope: &CacheScope, pks: &[PkValue]) -> Result<(), CacheError> {
        for pk in pks {
            self.remove(scope, pk)?;
        }
        Ok(())
    }

    fn get_count(&self, scope: &CacheScope) -> Result<Option<u64>, CacheError> {
        let key = count_key(scope);
        match self.transport.get(&key)? {
            Some(bytes) => Ok(Some(parse_count(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    fn set_count(&self, scope: &CacheScope, count: u64) -> Result<(), CacheError> {
        // Counts are kept until explicitly removed.
        self.transport
            .put(&count_key(scope), count.to_string().into_bytes(), None)
    }

    fn incr_count(&self, scope: &CacheScope, delta: u64) -> Result<Option<u64>, CacheError> {
        let delta = i64::try_from(delta).unwrap_or(i64::MAX);
        Ok(self
            .transport
            .incr(&count_key(scope), delta)?
            .map(|n| n.max(0) as u64))
    }

    fn decr_count(&self, scope: &CacheScope, delta: u64) -> Result<Option<u64>, CacheError> {
        let delta = i64::try_from(delta).unwrap_or(i64::MAX);
        Ok(self
            .transport
            .incr(&count_key(scope), -delta)?
            .map(|n| n.max(0) as u64))
    }

    fn remove_count(&self, scope: &CacheScope) -> Result<(), CacheError> {
        self.transport.remove(&count_key(scope))
    }
}

/// Query-result cache over a transport.
pub struct TransportSecondCache {
    transport: Arc<dyn CacheTransport>,
    query_ttl: Option<Duration>,
    // Highest generation seen by this process; reseeds start above it.
    high_water: AtomicU64,
}

impl TransportSecondCache {
    /// Create a second-level cache.
    pub fn new(transport: Arc<dyn CacheTransport>, config: &CacheConfig) -> Self {
        Self {
            transport,
            query_ttl: config.query_ttl,
            high_water: AtomicU64::new(0),
        }
    }

    /// Current generation of a logical table.
    ///
    /// A missing counter (never written, or evicted by the transport) is
    /// seeded with a fresh generation, so results filed under any earlier
    /// generation stay unreachable.
    pub fn generation(&self, cluster: &str, table: &str) -> Result<u64, CacheError> {
        let key = generation_key(cluster, table);
        if let Some(bytes) = self.transport.get(&key)? {
            return Ok(self.observe(parse_count(&key, &bytes)?));
        }
        let seed = self.reseed(&key)?;
        trace!(cluster, table, generation = seed, "[cache] query generation seeded");
        Ok(seed)
    }

    fn observe(&self, generation: u64) -> u64 {
        self.high_water.fetch_max(generation, Ordering::SeqCst);
        generation
    }

    /// Write a generation above the clock and above every generation this
    /// process has seen.
    fn reseed(&self, key: &str) -> Result<u64, CacheError> {
        let floor = self.high_water.load(Ordering::SeqCst).saturating_add(1);
        let clock = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        // Counters are incremented as i64 by the transport.
        let seed = clock.max(floor).min(i64::MAX as u64);
        self.transport.put(key, seed.to_string().into_bytes(), None)?;
        Ok(self.observe(seed))
    }
}

impl SecondCache for TransportSecondCache {
    fn get(&self, scope: &CacheScope, query: &Query) -> Result<QueryLookup, CacheError> {
        let generation = self.generation(scope.cluster(), scope.table())?;
        let key = query_key(generation, scope, &query.normalized());
        let rows = match self.transport.get(&key)? {
            Some(bytes) => Some(decode(&bytes)?),
            None => None,
        };
        Ok(QueryLookup { generation, rows })
    }

    fn put(
        &self,
        scope: &CacheScope,
        query: &Query,
        generation: u64,
        rows: &[Row],
    ) -> Result<(), CacheError> {
        let key = query_key(generation, scope, &query.normalized());
        self.transport.put(&key, encode(&rows)?, self.query_ttl)
    }

    fn invalidate(&self, cluster: &str, table: &str) -> Result<(), CacheError> {
        let key = generation_key(cluster, table);
        let generation = match self.transport.incr(&key, 1)? {
            Some(n) => self.observe(n.max(0) as u64),
            None => self.reseed(&key)?,
        };
        trace!(cluster, table, generation, "[cache] query results invalidated");
        Ok(())
    }
}
