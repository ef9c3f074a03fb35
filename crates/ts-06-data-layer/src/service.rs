//! # Sharded Storage Service
//!
//! One logical view over every shard of every cluster.
//!
//! ## Write Path
//!
//! ```text
//! save / update / remove
//!   ├── resolve descriptor, check the key
//!   ├── fill missing primary keys (save only)
//!   ├── route to the master shard
//!   ├── run in autocommit, or enlist into the caller's transaction
//!   └── L1: bump count / drop rows   L2: invalidate the table
//! ```
//!
//! ## Read Path
//!
//! ```text
//! find / count
//!   ├── cache lookup (scope = master shard of the key)
//!   ├── store read on the requested target
//!   ├── slave came back empty or zero → read the master once more
//!   └── write the result back to the cache
//! ```
//!
//! Cache scopes always use the master route, so a row read from a slave and
//! the same row written on the master share one cache entry.
//!
//! Cache errors never surface. They are logged at `warn` and the call goes
//! to the store.

use crate::config::StorageConfig;
use crate::domain::{DataLayerError, EntityKey, QueryKind};
use crate::metrics;
use crate::slow_query::SlowQueryLog;
use shared_types::{
    EntityDescriptor, MetadataRegistry, PkValue, Query, Row, Statement, StoreConnection,
    StoreError, StoreOutcome, Value,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use ts_01_routing::{ReadTarget, RouteDecision, ShardRouter};
use ts_02_id_generation::IdGenerator;
use ts_03_cache::{CacheError, CacheScope, CacheTransport, PrimaryCache, SecondCache};
use ts_04_transactions::{Transaction, TransactionCoordinator, TransactionError};
use ts_05_task_executor::{RecordIterator, RecordTask, ShardSource, TaskExecutor, TaskHandle};

/// Sharded storage facade.
pub struct ShardedStorage {
    pub(crate) registry: Arc<MetadataRegistry>,
    pub(crate) router: Arc<ShardRouter>,
    pub(crate) ids: Arc<IdGenerator>,
    pub(crate) primary: Option<Arc<dyn PrimaryCache>>,
    pub(crate) second: Option<Arc<dyn SecondCache>>,
    pub(crate) cache_transport: Option<Arc<dyn CacheTransport>>,
    pub(crate) coordinator: TransactionCoordinator,
    pub(crate) executor: Arc<TaskExecutor>,
    pub(crate) slow_log: SlowQueryLog,
    pub(crate) config: StorageConfig,
}

/// Log and swallow a cache failure.
fn soft<T>(op: &'static str, result: Result<T, CacheError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            metrics::record_cache_error();
            warn!(op, error = %e, "[data-layer] cache call failed, using the store");
            None
        }
    }
}

fn needs_id(row: &Row, pk_field: &str) -> bool {
    row.get(pk_field).map(Value::is_null).unwrap_or(true)
}

impl ShardedStorage {
    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Entity registry.
    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Shard router.
    pub fn router(&self) -> &Arc<ShardRouter> {
        &self.router
    }

    /// Id generator.
    pub fn id_generator(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// Task executor for whole-entity batch runs.
    pub fn task_executor(&self) -> &Arc<TaskExecutor> {
        &self.executor
    }

    /// Configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Next id for an entity's table.
    pub fn gen_id(&self, entity: &str) -> Result<i64, DataLayerError> {
        let desc = self.registry.get(entity)?;
        Ok(self.ids.gen_id(&desc.cluster, &desc.table)?)
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Insert one row, generating its primary key when absent.
    pub fn save(
        &self,
        entity: &str,
        key: &EntityKey,
        row: Row,
        tx: Option<&mut Transaction>,
    ) -> Result<PkValue, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        self.save_batch(entity, key, vec![row], tx)?
            .into_iter()
            .next()
            .ok_or_else(|| DataLayerError::MissingPrimaryKey {
                entity: desc.name.clone(),
                field: desc.primary_key.clone(),
            })
    }

    /// Insert rows into the shard of `key`. Returns the primary keys in row
    /// order.
    pub fn save_batch(
        &self,
        entity: &str,
        key: &EntityKey,
        mut rows: Vec<Row>,
        tx: Option<&mut Transaction>,
    ) -> Result<Vec<PkValue>, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let missing = rows.iter().filter(|r| needs_id(r, &desc.primary_key)).count();
        let mut ids = match missing {
            0 => Vec::new(),
            1 => vec![self.ids.gen_id(&desc.cluster, &desc.table)?],
            n => self.ids.gen_id_batch(&desc.cluster, &desc.table, n)?,
        }
        .into_iter();

        let mut pks = Vec::with_capacity(rows.len());
        for row in rows.iter_mut() {
            if needs_id(row, &desc.primary_key) {
                if let Some(id) = ids.next() {
                    row.set(desc.primary_key.as_str(), id);
                }
            }
            pks.push(self.pk_of(&desc, row)?);
        }

        let decision = self.route(&desc, key, ReadTarget::Master)?;
        let statement = Statement::Insert {
            table: decision.physical_table(),
            pk_field: desc.primary_key.clone(),
            rows,
        };
        let inserted = self.run(tx, decision.clone(), statement, QueryKind::Scan, true, |o| {
            o.affected()
        })?;
        debug!(entity = %desc.name, shard = %decision, rows = inserted, "[data-layer] saved");

        let scope = self.scope(&desc, &decision);
        if let Some(cache) = self.l1(&desc, true) {
            soft("incr_count", cache.incr_count(&scope, inserted));
        }
        self.invalidate_queries(&desc);
        Ok(pks)
    }

    /// Update one row by primary key. Returns the number of rows changed.
    pub fn update(
        &self,
        entity: &str,
        key: &EntityKey,
        row: Row,
        tx: Option<&mut Transaction>,
    ) -> Result<u64, DataLayerError> {
        self.update_batch(entity, key, vec![row], tx)
    }

    /// Update rows by primary key in the shard of `key`.
    pub fn update_batch(
        &self,
        entity: &str,
        key: &EntityKey,
        rows: Vec<Row>,
        tx: Option<&mut Transaction>,
    ) -> Result<u64, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        if rows.is_empty() {
            return Ok(0);
        }
        let pks = rows
            .iter()
            .map(|row| self.pk_of(&desc, row))
            .collect::<Result<Vec<_>, _>>()?;

        let decision = self.route(&desc, key, ReadTarget::Master)?;
        let statement = Statement::Update {
            table: decision.physical_table(),
            pk_field: desc.primary_key.clone(),
            rows,
        };
        let updated = self.run(tx, decision.clone(), statement, QueryKind::Scan, true, |o| {
            o.affected()
        })?;
        debug!(entity = %desc.name, shard = %decision, rows = updated, "[data-layer] updated");

        let scope = self.scope(&desc, &decision);
        if let Some(cache) = self.l1(&desc, true) {
            soft("remove_many", cache.remove_many(&scope, &pks));
        }
        self.invalidate_queries(&desc);
        Ok(updated)
    }

    /// Delete one row by primary key. Returns the number of rows deleted.
    pub fn remove_by_pk(
        &self,
        entity: &str,
        key: &EntityKey,
        pk: &PkValue,
        tx: Option<&mut Transaction>,
    ) -> Result<u64, DataLayerError> {
        self.remove_by_pks(entity, key, std::slice::from_ref(pk), tx)
    }

    /// Delete rows by primary key from the shard of `key`.
    pub fn remove_by_pks(
        &self,
        entity: &str,
        key: &EntityKey,
        pks: &[PkValue],
        tx: Option<&mut Transaction>,
    ) -> Result<u64, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        if pks.is_empty() {
            return Ok(0);
        }
        let decision = self.route(&desc, key, ReadTarget::Master)?;
        let statement = Statement::Delete {
            table: decision.physical_table(),
            pk_field: desc.primary_key.clone(),
            pks: pks.to_vec(),
        };
        let removed = self.run(tx, decision.clone(), statement, QueryKind::Scan, true, |o| {
            o.affected()
        })?;
        debug!(entity = %desc.name, shard = %decision, rows = removed, "[data-layer] removed");

        let scope = self.scope(&desc, &decision);
        if let Some(cache) = self.l1(&desc, true) {
            soft("remove_many", cache.remove_many(&scope, pks));
            if removed > 0 {
                soft("decr_count", cache.decr_count(&scope, removed));
            }
        }
        self.invalidate_queries(&desc);
        Ok(removed)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Row by primary key.
    pub fn find_by_pk(
        &self,
        entity: &str,
        key: &EntityKey,
        pk: &PkValue,
        read: ReadTarget,
        use_cache: bool,
    ) -> Result<Option<Row>, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        let decision = self.route(&desc, key, read)?;
        let master = self.master_of(&desc, key, read, &decision)?;
        let scope = self.scope(&desc, &master);
        let cache = self.l1(&desc, use_cache);

        if let Some(cache) = cache {
            let cached = soft("get", cache.get(&scope, pk)).flatten();
            metrics::record_cache_lookup("l1", cached.is_some());
            if cached.is_some() {
                return Ok(cached);
            }
        }

        let mut found = self
            .select_by_pks(&desc, decision, vec![pk.clone()], QueryKind::Pk)?
            .into_iter()
            .next();
        if found.is_none() && read.is_slave() {
            debug!(entity = %desc.name, pk = %pk, target = %read, "[data-layer] slave miss, reading master");
            found = self
                .select_by_pks(&desc, master, vec![pk.clone()], QueryKind::Pk)?
                .into_iter()
                .next();
        }

        if let (Some(cache), Some(row)) = (cache, found.as_ref()) {
            soft("put", cache.put(&scope, pk, row));
        }
        Ok(found)
    }

    /// Rows by primary keys, in request order. Absent rows are skipped.
    ///
    /// Cache hits are served from L1; every miss is loaded in one store
    /// round trip and written back.
    pub fn find_by_pks(
        &self,
        entity: &str,
        key: &EntityKey,
        pks: &[PkValue],
        read: ReadTarget,
        use_cache: bool,
    ) -> Result<Vec<Row>, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        if pks.is_empty() {
            return Ok(Vec::new());
        }
        let decision = self.route(&desc, key, read)?;
        let master = self.master_of(&desc, key, read, &decision)?;
        let scope = self.scope(&desc, &master);
        let cache = self.l1(&desc, use_cache);

        let mut slots = cache
            .and_then(|c| soft("get_many", c.get_many(&scope, pks)))
            .filter(|slots| slots.len() == pks.len())
            .unwrap_or_else(|| vec![None; pks.len()]);
        if cache.is_some() {
            let hits = slots.iter().filter(|s| s.is_some()).count();
            metrics::record_cache_lookup("l1", hits == pks.len());
        }

        let mut missing: Vec<PkValue> = Vec::new();
        let mut seen = HashSet::new();
        for (pk, slot) in pks.iter().zip(slots.iter()) {
            if slot.is_none() && seen.insert(pk.clone()) {
                missing.push(pk.clone());
            }
        }
        if missing.is_empty() {
            return Ok(slots.into_iter().flatten().collect());
        }

        let mut loaded = self.select_by_pks(&desc, decision, missing.clone(), QueryKind::Pks)?;
        if read.is_slave() && loaded.len() < missing.len() {
            let have: HashSet<PkValue> = loaded
                .iter()
                .filter_map(|r| r.pk(&desc.primary_key))
                .collect();
            let rest: Vec<PkValue> = missing.into_iter().filter(|pk| !have.contains(pk)).collect();
            debug!(entity = %desc.name, missing = rest.len(), target = %read, "[data-layer] slave misses, reading master");
            loaded.extend(self.select_by_pks(&desc, master, rest, QueryKind::Pks)?);
        }

        let by_pk: HashMap<PkValue, Row> = loaded
            .into_iter()
            .filter_map(|row| row.pk(&desc.primary_key).map(|pk| (pk, row)))
            .collect();
        if let Some(cache) = cache {
            let pairs: Vec<(PkValue, Row)> =
                by_pk.iter().map(|(pk, row)| (pk.clone(), row.clone())).collect();
            if !pairs.is_empty() {
                soft("put_many", cache.put_many(&scope, &pairs));
            }
        }

        for (pk, slot) in pks.iter().zip(slots.iter_mut()) {
            if slot.is_none() {
                *slot = by_pk.get(pk).cloned();
            }
        }
        Ok(slots.into_iter().flatten().collect())
    }

    /// Rows matching `query` in the shard of `key`, through the query cache.
    pub fn find_by_query(
        &self,
        entity: &str,
        key: &EntityKey,
        query: &Query,
        read: ReadTarget,
        use_cache: bool,
    ) -> Result<Vec<Row>, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        let decision = self.route(&desc, key, read)?;
        let master = self.master_of(&desc, key, read, &decision)?;
        let scope = self.scope(&desc, &master);
        let cache = self.l2(&desc, use_cache);

        // Write-backs go under the generation seen at lookup time.
        let mut generation = None;
        if let Some(lookup) = cache.and_then(|c| soft("query_get", c.get(&scope, query))) {
            metrics::record_cache_lookup("l2", lookup.rows.is_some());
            if let Some(rows) = lookup.rows {
                return Ok(rows);
            }
            generation = Some(lookup.generation);
        }

        let statement = Statement::Select {
            table: decision.physical_table(),
            query: query.clone(),
        };
        let rows = self.run(None, decision, statement, QueryKind::Query, false, |o| {
            o.into_rows()
        })?;

        if let (Some(cache), Some(generation)) = (cache, generation) {
            soft("query_put", cache.put(&scope, query, generation, &rows));
        }
        Ok(rows)
    }

    /// Rows of the shard of `key`, through the row-count cache.
    ///
    /// A zero count from a slave is read again from the master.
    pub fn count(
        &self,
        entity: &str,
        key: &EntityKey,
        read: ReadTarget,
        use_cache: bool,
    ) -> Result<u64, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        let decision = self.route(&desc, key, read)?;
        let master = self.master_of(&desc, key, read, &decision)?;
        let scope = self.scope(&desc, &master);
        let cache = self.l1(&desc, use_cache);

        if let Some(cache) = cache {
            let cached = soft("get_count", cache.get_count(&scope)).flatten();
            metrics::record_cache_lookup("count", cached.is_some());
            if let Some(n) = cached {
                return Ok(n);
            }
        }

        let mut n = self.count_on(decision, &Query::new())?;
        if n == 0 && read.is_slave() {
            debug!(entity = %desc.name, target = %read, "[data-layer] slave count is zero, reading master");
            n = self.count_on(master, &Query::new())?;
        }
        if let Some(cache) = cache {
            soft("set_count", cache.set_count(&scope, n));
        }
        Ok(n)
    }

    /// Rows of the shard of `key` matching `query`. Not cached.
    pub fn count_by_query(
        &self,
        entity: &str,
        key: &EntityKey,
        query: &Query,
        read: ReadTarget,
    ) -> Result<u64, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        let decision = self.route(&desc, key, read)?;
        self.count_on(decision, query)
    }

    /// Rows of an entity across every shard.
    ///
    /// Master counts use the per-shard count cache. Slave fan-outs bypass it
    /// and fall back to the masters when they total zero.
    pub fn count_all(
        &self,
        entity: &str,
        read: ReadTarget,
        use_cache: bool,
    ) -> Result<u64, DataLayerError> {
        let desc = self.registry.get(entity)?;
        if !desc.is_sharded() {
            return self.count(entity, &EntityKey::Global, read, use_cache);
        }

        match read {
            ReadTarget::Master => {
                let cache = self.l1(&desc, use_cache);
                let mut total = 0u64;
                for decision in self.router.all_master_shards(&desc.cluster, &desc.table, desc.table_count)? {
                    let scope = self.scope(&desc, &decision);
                    let cached = cache.and_then(|c| soft("get_count", c.get_count(&scope)).flatten());
                    let n = match cached {
                        Some(n) => n,
                        None => {
                            let n = self.count_on(decision, &Query::new())?;
                            if let Some(c) = cache {
                                soft("set_count", c.set_count(&scope, n));
                            }
                            n
                        }
                    };
                    total += n;
                }
                Ok(total)
            }
            ReadTarget::Slave(index) => {
                let mut total = 0u64;
                for decision in self.router.all_slave_shards(
                    &desc.cluster,
                    &desc.table,
                    desc.table_count,
                    index,
                )? {
                    total += self.count_on(decision, &Query::new())?;
                }
                if total == 0 {
                    debug!(entity = %desc.name, target = %read, "[data-layer] slave total is zero, reading masters");
                    return self.count_all(entity, ReadTarget::Master, use_cache);
                }
                Ok(total)
            }
        }
    }

    // =========================================================================
    // TRANSACTIONS AND BATCH COMPONENTS
    // =========================================================================

    /// Begin a transaction with the configured timeout.
    pub fn begin(&self) -> Result<Transaction, DataLayerError> {
        Ok(self.coordinator.begin()?)
    }

    /// Commit a transaction, reporting partial commits.
    pub fn commit(&self, tx: &mut Transaction) -> Result<(), DataLayerError> {
        tx.commit().map_err(|e| {
            if let TransactionError::PartialCommit { committed, failed, .. } = &e {
                metrics::record_partial_commit();
                warn!(
                    tx_id = %tx.id(),
                    committed = ?committed,
                    failed,
                    "[data-layer] transaction partially committed"
                );
            }
            DataLayerError::Transaction(e)
        })
    }

    /// Roll back a transaction.
    pub fn rollback(&self, tx: &mut Transaction) -> Result<(), DataLayerError> {
        Ok(tx.rollback()?)
    }

    /// Windowed iterator over the master table of `key`.
    pub fn iterator(
        &self,
        entity: &str,
        key: &EntityKey,
        filter: Option<Query>,
        step: Option<u64>,
    ) -> Result<RecordIterator, DataLayerError> {
        let desc = self.descriptor(entity, key)?;
        let decision = self.route(&desc, key, ReadTarget::Master)?;
        let source = ShardSource::new(decision, self.coordinator.clone());
        Ok(RecordIterator::new(
            Box::new(source),
            desc.primary_key.as_str(),
            filter,
            step.unwrap_or(self.config.executor.default_step),
        )?)
    }

    /// Run `task` over every row of an entity.
    pub fn execute_task(
        &self,
        entity: &str,
        task: Arc<dyn RecordTask>,
        filter: Option<Query>,
    ) -> Result<TaskHandle, DataLayerError> {
        let desc = self.registry.get(entity)?;
        Ok(self.executor.execute(&desc, task, filter)?)
    }

    /// Close every endpoint pool and the cache transport.
    pub fn shutdown(&self) {
        self.router.topology().shutdown();
        if let Some(transport) = &self.cache_transport {
            transport.shutdown();
        }
        info!("[data-layer] storage shut down");
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Descriptor of `entity`, checked against the key's mode and cluster.
    fn descriptor(&self, entity: &str, key: &EntityKey) -> Result<Arc<EntityDescriptor>, DataLayerError> {
        let desc = self.registry.get(entity)?;
        let mismatch = |reason: String| DataLayerError::KeyMismatch {
            entity: desc.name.clone(),
            reason,
        };
        match (key, desc.is_sharded()) {
            (EntityKey::Global, false) => {}
            (EntityKey::Sharded(k), true) if k.cluster() == desc.cluster => {}
            (EntityKey::Sharded(k), true) => {
                return Err(mismatch(format!(
                    "key targets cluster {} but the entity lives in {}",
                    k.cluster(),
                    desc.cluster
                )))
            }
            (EntityKey::Global, true) => {
                return Err(mismatch("sharded entity needs a sharding key".to_string()))
            }
            (EntityKey::Sharded(_), false) => {
                return Err(mismatch("global entity takes no sharding key".to_string()))
            }
        }
        Ok(desc)
    }

    fn route(
        &self,
        desc: &EntityDescriptor,
        key: &EntityKey,
        target: ReadTarget,
    ) -> Result<RouteDecision, DataLayerError> {
        let decision = match key {
            EntityKey::Global => self.router.route_global(&desc.cluster, &desc.table, target)?,
            EntityKey::Sharded(k) => self.router.route(k, &desc.table, target, desc.table_count)?,
        };
        Ok(decision)
    }

    /// Master decision for a read, reusing `decision` when it already is one.
    fn master_of(
        &self,
        desc: &EntityDescriptor,
        key: &EntityKey,
        read: ReadTarget,
        decision: &RouteDecision,
    ) -> Result<RouteDecision, DataLayerError> {
        if read.is_slave() {
            self.route(desc, key, ReadTarget::Master)
        } else {
            Ok(decision.clone())
        }
    }

    fn scope(&self, desc: &EntityDescriptor, master: &RouteDecision) -> CacheScope {
        if desc.is_sharded() {
            CacheScope::shard(master.signature())
        } else {
            CacheScope::global(desc.cluster.as_str(), desc.table.as_str())
        }
    }

    fn l1(&self, desc: &EntityDescriptor, use_cache: bool) -> Option<&Arc<dyn PrimaryCache>> {
        self.primary.as_ref().filter(|_| use_cache && desc.cacheable)
    }

    fn l2(&self, desc: &EntityDescriptor, use_cache: bool) -> Option<&Arc<dyn SecondCache>> {
        self.second.as_ref().filter(|_| use_cache && desc.cacheable)
    }

    fn invalidate_queries(&self, desc: &EntityDescriptor) {
        if let Some(cache) = self.l2(desc, true) {
            soft("invalidate", cache.invalidate(&desc.cluster, &desc.table));
        }
    }

    fn pk_of(&self, desc: &EntityDescriptor, row: &Row) -> Result<PkValue, DataLayerError> {
        row.pk(&desc.primary_key)
            .ok_or_else(|| DataLayerError::MissingPrimaryKey {
                entity: desc.name.clone(),
                field: desc.primary_key.clone(),
            })
    }

    fn select_by_pks(
        &self,
        desc: &EntityDescriptor,
        decision: RouteDecision,
        pks: Vec<PkValue>,
        kind: QueryKind,
    ) -> Result<Vec<Row>, DataLayerError> {
        if pks.is_empty() {
            return Ok(Vec::new());
        }
        let statement = Statement::SelectByPks {
            table: decision.physical_table(),
            pk_field: desc.primary_key.clone(),
            pks,
        };
        self.run(None, decision, statement, kind, false, |o| o.into_rows())
    }

    fn count_on(&self, decision: RouteDecision, query: &Query) -> Result<u64, DataLayerError> {
        let statement = Statement::Count {
            table: decision.physical_table(),
            query: query.filter_only(),
        };
        self.run(None, decision, statement, QueryKind::Count, false, |o| {
            o.into_count()
        })
    }

    /// Run one timed statement, in autocommit or inside `tx`.
    ///
    /// A failure inside a transaction marks it rollback-only.
    fn run<T, E>(
        &self,
        tx: Option<&mut Transaction>,
        decision: RouteDecision,
        statement: Statement,
        kind: QueryKind,
        write: bool,
        extract: E,
    ) -> Result<T, DataLayerError>
    where
        E: FnOnce(StoreOutcome) -> Result<T, StoreError>,
    {
        let resource = decision.to_string();
        let slow_log = &self.slow_log;
        let work = move |conn: &mut dyn StoreConnection| {
            let outcome = slow_log.time(kind, &resource, || conn.execute(&statement))?;
            extract(outcome)
        };

        let result = match tx {
            Some(tx) => {
                let result = if write {
                    self.coordinator.execute(Some(&mut *tx), decision, work)
                } else {
                    self.coordinator.read(Some(&mut *tx), decision, work)
                };
                if result.is_err() && tx.is_active() {
                    warn!(tx_id = %tx.id(), "[data-layer] statement failed, transaction marked rollback-only");
                    tx.set_rollback_only();
                }
                result
            }
            None if write => self.coordinator.execute(None, decision, work),
            None => self.coordinator.read(None, decision, work),
        };
        result.map_err(DataLayerError::flatten)
    }
}

impl std::fmt::Debug for ShardedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedStorage")
            .field("entities", &self.registry.len())
            .field("l1", &self.primary.is_some())
            .field("l2", &self.second.is_some())
            .field("config", &self.config)
            .finish()
    }
}
