//! # Shard Source
//!
//! Scans one physical table through autocommit reads. Every call borrows a
//! connection and releases it before returning, so an idle iterator holds
//! no connection.

use crate::domain::TaskError;
use crate::ports::RecordSource;
use shared_types::{Query, Row, Statement, StoreConnection};
use ts_01_routing::RouteDecision;
use ts_04_transactions::TransactionCoordinator;

/// Record source over a route decision.
#[derive(Debug, Clone)]
pub struct ShardSource {
    decision: RouteDecision,
    coordinator: TransactionCoordinator,
}

impl ShardSource {
    /// Create a source for `decision`.
    pub fn new(decision: RouteDecision, coordinator: TransactionCoordinator) -> Self {
        Self {
            decision,
            coordinator,
        }
    }

    /// Route decision being scanned.
    pub fn decision(&self) -> &RouteDecision {
        &self.decision
    }
}

impl RecordSource for ShardSource {
    fn describe(&self) -> String {
        self.decision.to_string()
    }

    fn select(&mut self, query: &Query) -> Result<Vec<Row>, TaskError> {
        let statement = Statement::Select {
            table: self.decision.physical_table(),
            query: query.clone(),
        };
        let rows = self
            .coordinator
            .read(None, self.decision.clone(), |conn: &mut dyn StoreConnection| {
                conn.execute(&statement)?.into_rows()
            })?;
        Ok(rows)
    }

    fn count(&mut self, query: &Query) -> Result<u64, TaskError> {
        let statement = Statement::Count {
            table: self.decision.physical_table(),
            query: query.filter_only(),
        };
        let count = self
            .coordinator
            .read(None, self.decision.clone(), |conn: &mut dyn StoreConnection| {
                conn.execute(&statement)?.into_count()
            })?;
        Ok(count)
    }
}
