//! # Inbound Ports
//!
//! Cache contracts consumed by the data layer.
//!
//! Both levels are best-effort and not linearizable. Writers invalidate;
//! they never overwrite a cached row with a new version.

use crate::domain::{CacheError, CacheScope};
use shared_types::{PkValue, Query, Row};

/// First-level cache: rows by primary key, plus per-scope row counts.
pub trait PrimaryCache: Send + Sync {
    /// Cached row.
    fn get(&self, scope: &CacheScope, pk: &PkValue) -> Result<Option<Row>, CacheError>;

    /// Cache a row.
    fn put(&self, scope: &CacheScope, pk: &PkValue, row: &Row) -> Result<(), CacheError>;

    /// Drop a row.
    fn remove(&self, scope: &CacheScope, pk: &PkValue) -> Result<(), CacheError>;

    /// One slot per requested key, in request order.
    fn get_many(&self, scope: &CacheScope, pks: &[PkValue]) -> Result<Vec<Option<Row>>, CacheError>;

    /// Cache several rows.
    fn put_many(&self, scope: &CacheScope, rows: &[(PkValue, Row)]) -> Result<(), CacheError>;

    /// Drop several rows.
    fn remove_many(&self, scope: &CacheScope, pks: &[PkValue]) -> Result<(), CacheError>;

    /// Cached row count.
    fn get_count(&self, scope: &CacheScope) -> Result<Option<u64>, CacheError>;

    /// Set the row count.
    fn set_count(&self, scope: &CacheScope, count: u64) -> Result<(), CacheError>;

    /// Increase a cached count. No-op when nothing is cached.
    fn incr_count(&self, scope: &CacheScope, delta: u64) -> Result<Option<u64>, CacheError>;

    /// Decrease a cached count, saturating at 0. No-op when nothing is cached.
    fn decr_count(&self, scope: &CacheScope, delta: u64) -> Result<Option<u64>, CacheError>;

    /// Drop a cached count.
    fn remove_count(&self, scope: &CacheScope) -> Result<(), CacheError>;
}

/// Result of an L2 lookup.
///
/// `generation` is the table generation the lookup ran under. A caller that
/// misses, loads from the store and writes back passes it to
/// [`SecondCache::put`], so a result read before a concurrent invalidation
/// is filed under the old generation and never served.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryLookup {
    /// Generation of the logical table at lookup time.
    pub generation: u64,
    /// Cached rows, `None` on a miss.
    pub rows: Option<Vec<Row>>,
}

/// Second-level cache: query results per scope.
pub trait SecondCache: Send + Sync {
    /// Cached result of `query` in `scope`, with the generation it was looked
    /// up under.
    fn get(&self, scope: &CacheScope, query: &Query) -> Result<QueryLookup, CacheError>;

    /// Cache the result of `query` in `scope` under `generation`.
    fn put(
        &self,
        scope: &CacheScope,
        query: &Query,
        generation: u64,
        rows: &[Row],
    ) -> Result<(), CacheError>;

    /// Drop every cached result of a logical table, across all its shards.
    fn invalidate(&self, cluster: &str, table: &str) -> Result<(), CacheError>;
}
