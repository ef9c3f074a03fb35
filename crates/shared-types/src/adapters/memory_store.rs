//! In-memory physical database.
//!
//! One [`MemoryStore`] stands for one physical database holding any number
//! of tables. [`MemoryStore::pool`] exposes it through [`ConnectionPool`].
//!
//! Local transactions stage a private copy of every table they touch;
//! `commit` writes the staged tables back, `rollback` drops them.
//!
//! Fault injection hooks (`fail_next_commits`, `set_available`,
//! `set_latency`) let tests drive the failure paths of the layers above.

use crate::entities::{PkValue, Row};
use crate::errors::StoreError;
use crate::store::{ConnectionPool, Statement, StoreConnection, StoreOutcome};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type Table = BTreeMap<PkValue, Row>;

struct StoreInner {
    name: String,
    tables: RwLock<HashMap<String, Table>>,
    available: AtomicBool,
    failing_commits: AtomicU32,
    statements: AtomicU64,
    latency: RwLock<Option<Duration>>,
}

/// In-memory physical database.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    /// Create an empty database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                name: name.into(),
                tables: RwLock::new(HashMap::new()),
                available: AtomicBool::new(true),
                failing_commits: AtomicU32::new(0),
                statements: AtomicU64::new(0),
                latency: RwLock::new(None),
            }),
        }
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Connection pool over this database.
    pub fn pool(&self) -> Arc<MemoryPool> {
        Arc::new(MemoryPool {
            store: self.clone(),
            closed: AtomicBool::new(false),
        })
    }

    /// Make the next `n` commits fail.
    pub fn fail_next_commits(&self, n: u32) {
        self.inner.failing_commits.store(n, Ordering::SeqCst);
    }

    /// Toggle availability. An unavailable store refuses new connections.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Add a fixed delay to every statement.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.inner.latency.write() = latency;
    }

    /// Number of statements executed so far.
    pub fn statements_executed(&self) -> u64 {
        self.inner.statements.load(Ordering::SeqCst)
    }

    /// Seed rows directly, bypassing connections. Existing keys are replaced.
    pub fn insert_rows(&self, table: &str, pk_field: &str, rows: Vec<Row>) {
        let mut tables = self.inner.tables.write();
        let target = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Some(pk) = row.pk(pk_field) {
                target.insert(pk, row);
            }
        }
    }

    /// Committed row count of a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.inner
            .tables
            .read()
            .get(table)
            .map(|t| t.len())
            .unwrap_or(0)
    }

    /// Committed rows of a table in key order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.inner
            .tables
            .read()
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    fn take_commit_failure(&self) -> bool {
        self.inner
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("name", &self.inner.name)
            .finish()
    }
}

/// Pool handing out [`MemoryConnection`]s.
pub struct MemoryPool {
    store: MemoryStore,
    closed: AtomicBool,
}

impl MemoryPool {
    /// Underlying store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Check whether the pool was closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl ConnectionPool for MemoryPool {
    fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        if self.is_closed() {
            return Err(StoreError::PoolClosed(self.store.name().to_string()));
        }
        if !self.store.inner.available.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionUnavailable(
                self.store.name().to_string(),
            ));
        }
        Ok(Box::new(MemoryConnection {
            store: self.store.clone(),
            staged: None,
        }))
    }

    fn database_name(&self) -> &str {
        self.store.name()
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(database = %self.store.name(), "[memory-store] pool closed");
        }
    }
}

/// Connection to a [`MemoryStore`].
pub struct MemoryConnection {
    store: MemoryStore,
    /// Tables copied on first touch inside a local transaction.
    staged: Option<HashMap<String, Table>>,
}

impl MemoryConnection {
    fn with_table<T>(&mut self, table: &str, f: impl FnOnce(&mut Table) -> T) -> T {
        match self.staged.as_mut() {
            Some(staged) => {
                let entry = staged.entry(table.to_string()).or_insert_with(|| {
                    self.store
                        .inner
                        .tables
                        .read()
                        .get(table)
                        .cloned()
                        .unwrap_or_default()
                });
                f(entry)
            }
            None => {
                let mut tables = self.store.inner.tables.write();
                f(tables.entry(table.to_string()).or_default())
            }
        }
    }

    fn read_table<T>(&self, table: &str, f: impl FnOnce(Option<&Table>) -> T) -> T {
        if let Some(staged) = self.staged.as_ref() {
            if let Some(t) = staged.get(table) {
                return f(Some(t));
            }
        }
        let tables = self.store.inner.tables.read();
        f(tables.get(table))
    }
}

fn require_pk(row: &Row, table: &str, pk_field: &str) -> Result<PkValue, StoreError> {
    row.pk(pk_field).ok_or_else(|| StoreError::MissingPrimaryKey {
        table: table.to_string(),
        field: pk_field.to_string(),
    })
}

impl StoreConnection for MemoryConnection {
    fn execute(&mut self, statement: &Statement) -> Result<StoreOutcome, StoreError> {
        self.store.inner.statements.fetch_add(1, Ordering::SeqCst);
        let latency = *self.store.inner.latency.read();
        if let Some(delay) = latency {
            std::thread::sleep(delay);
        }

        match statement {
            Statement::Insert {
                table,
                pk_field,
                rows,
            } => {
                let mut keyed = Vec::with_capacity(rows.len());
                for row in rows {
                    keyed.push((require_pk(row, table, pk_field)?, row.clone()));
                }
                self.with_table(table, |t| {
                    if let Some((pk, _)) = keyed.iter().find(|(pk, _)| t.contains_key(pk)) {
                        return Err(StoreError::DuplicateKey {
                            table: table.clone(),
                            pk: pk.to_string(),
                        });
                    }
                    let n = keyed.len() as u64;
                    t.extend(keyed);
                    Ok(StoreOutcome::Affected(n))
                })
            }
            Statement::Update {
                table,
                pk_field,
                rows,
            } => {
                let mut keyed = Vec::with_capacity(rows.len());
                for row in rows {
                    keyed.push((require_pk(row, table, pk_field)?, row.clone()));
                }
                let affected = self.with_table(table, |t| {
                    let mut n = 0;
                    for (pk, row) in keyed {
                        if let Some(slot) = t.get_mut(&pk) {
                            *slot = row;
                            n += 1;
                        }
                    }
                    n
                });
                Ok(StoreOutcome::Affected(affected))
            }
            Statement::Delete { table, pks, .. } => {
                let affected = self.with_table(table, |t| {
                    pks.iter().filter(|pk| t.remove(pk).is_some()).count() as u64
                });
                Ok(StoreOutcome::Affected(affected))
            }
            Statement::SelectByPks { table, pks, .. } => {
                let rows = self.read_table(table, |t| match t {
                    Some(t) => pks.iter().filter_map(|pk| t.get(pk).cloned()).collect(),
                    None => Vec::new(),
                });
                Ok(StoreOutcome::Rows(rows))
            }
            Statement::Select { table, query } => {
                let mut rows: Vec<Row> = self.read_table(table, |t| match t {
                    Some(t) => t.values().filter(|r| query.matches(r)).cloned().collect(),
                    None => Vec::new(),
                });
                query.arrange(&mut rows);
                Ok(StoreOutcome::Rows(rows))
            }
            Statement::Count { table, query } => {
                let n = self.read_table(table, |t| match t {
                    Some(t) => t.values().filter(|r| query.matches(r)).count() as u64,
                    None => 0,
                });
                Ok(StoreOutcome::Count(n))
            }
        }
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.staged.is_some() {
            return Err(StoreError::Execution(
                "transaction already started".to_string(),
            ));
        }
        self.staged = Some(HashMap::new());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| StoreError::CommitFailed("no active transaction".to_string()))?;

        if self.store.take_commit_failure() {
            return Err(StoreError::CommitFailed(format!(
                "injected failure on {}",
                self.store.name()
            )));
        }

        let mut tables = self.store.inner.tables.write();
        for (name, table) in staged {
            tables.insert(name, table);
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.staged = None;
        Ok(())
    }
}
