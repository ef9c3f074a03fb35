//! # Store Ports
//!
//! The physical store seen through two traits:
//!
//! - [`ConnectionPool`]: hands out connections for one physical database.
//! - [`StoreConnection`]: executes structured [`Statement`]s, with optional
//!   local transactions (`begin` / `commit` / `rollback`).
//!
//! Statements are structured values. Turning them into SQL text (or any other
//! wire form) is the responsibility of the adapter behind the port.

use crate::entities::{PkValue, Row};
use crate::errors::StoreError;
use crate::query::Query;

/// One structured statement against a physical table.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// Insert rows. Fails on a duplicate primary key.
    Insert {
        table: String,
        pk_field: String,
        rows: Vec<Row>,
    },
    /// Replace rows matched by primary key. Unknown keys are skipped.
    Update {
        table: String,
        pk_field: String,
        rows: Vec<Row>,
    },
    /// Delete rows by primary key.
    Delete {
        table: String,
        pk_field: String,
        pks: Vec<PkValue>,
    },
    /// Fetch rows by primary key.
    SelectByPks {
        table: String,
        pk_field: String,
        pks: Vec<PkValue>,
    },
    /// Fetch rows matching a query.
    Select { table: String, query: Query },
    /// Count rows matching a query. Ordering and limit are ignored.
    Count { table: String, query: Query },
}

/// Coarse statement classification, used for logging and metrics labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    SelectByPks,
    Select,
    Count,
}

impl StatementKind {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::SelectByPks => "select_by_pks",
            StatementKind::Select => "select",
            StatementKind::Count => "count",
        }
    }
}

impl Statement {
    /// Physical table the statement targets.
    pub fn table(&self) -> &str {
        match self {
            Statement::Insert { table, .. }
            | Statement::Update { table, .. }
            | Statement::Delete { table, .. }
            | Statement::SelectByPks { table, .. }
            | Statement::Select { table, .. }
            | Statement::Count { table, .. } => table,
        }
    }

    /// Statement kind.
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Insert { .. } => StatementKind::Insert,
            Statement::Update { .. } => StatementKind::Update,
            Statement::Delete { .. } => StatementKind::Delete,
            Statement::SelectByPks { .. } => StatementKind::SelectByPks,
            Statement::Select { .. } => StatementKind::Select,
            Statement::Count { .. } => StatementKind::Count,
        }
    }

    /// Check whether the statement mutates the table.
    pub fn is_write(&self) -> bool {
        matches!(
            self.kind(),
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete
        )
    }
}

/// Result of executing a statement.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreOutcome {
    /// Rows returned by a select.
    Rows(Vec<Row>),
    /// Rows affected by a write.
    Affected(u64),
    /// Result of a count.
    Count(u64),
}

impl StoreOutcome {
    /// Rows, or an error if the outcome has another shape.
    pub fn into_rows(self) -> Result<Vec<Row>, StoreError> {
        match self {
            StoreOutcome::Rows(rows) => Ok(rows),
            _ => Err(StoreError::UnexpectedOutcome { expected: "rows" }),
        }
    }

    /// Count, or an error if the outcome has another shape.
    pub fn into_count(self) -> Result<u64, StoreError> {
        match self {
            StoreOutcome::Count(n) => Ok(n),
            _ => Err(StoreError::UnexpectedOutcome { expected: "count" }),
        }
    }

    /// Affected rows, or an error if the outcome has another shape.
    pub fn affected(self) -> Result<u64, StoreError> {
        match self {
            StoreOutcome::Affected(n) => Ok(n),
            _ => Err(StoreError::UnexpectedOutcome {
                expected: "affected",
            }),
        }
    }
}

/// One connection to a physical database.
///
/// Outside `begin` the connection runs in autocommit mode.
pub trait StoreConnection: Send {
    /// Execute one statement.
    fn execute(&mut self, statement: &Statement) -> Result<StoreOutcome, StoreError>;

    /// Start a local transaction.
    fn begin(&mut self) -> Result<(), StoreError>;

    /// Commit the local transaction.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Roll back the local transaction.
    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Connection pool for one physical database.
pub trait ConnectionPool: Send + Sync {
    /// Borrow a connection.
    fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError>;

    /// Name of the physical database.
    fn database_name(&self) -> &str;

    /// Close the pool. Later `acquire` calls fail with `PoolClosed`.
    fn close(&self);
}
