//! # Shard Resource
//!
//! One borrowed connection to the physical table chosen by a route
//! decision. Single owner; created per operation or per transaction.
//!
//! A resource opened with [`ShardResource::open`] holds a local transaction.
//! Dropping it while that transaction is unfinished rolls it back before the
//! connection is released.

use crate::domain::TransactionError;
use crate::ports::TransactionalResource;
use shared_types::{ShardSignature, Statement, StoreConnection, StoreError, StoreOutcome};
use tracing::{trace, warn};
use ts_01_routing::RouteDecision;

/// Connection to one physical shard table.
pub struct ShardResource {
    decision: RouteDecision,
    signature: ShardSignature,
    connection: Option<Box<dyn StoreConnection>>,
    /// A local transaction was begun and not yet finished.
    pending: bool,
}

impl ShardResource {
    /// Acquire a connection and begin a local transaction.
    pub fn open(decision: RouteDecision) -> Result<Self, TransactionError> {
        let mut resource = Self::connect(decision)?;
        if let Some(conn) = resource.connection.as_mut() {
            conn.begin()?;
            resource.pending = true;
        }
        Ok(resource)
    }

    /// Acquire a connection in autocommit mode, for reads.
    pub fn connect(decision: RouteDecision) -> Result<Self, TransactionError> {
        let pool = decision.endpoint.pool()?;
        let connection = pool.acquire()?;
        let signature = decision.signature();
        trace!(resource = %decision, "[resource] connection acquired");
        Ok(Self {
            decision,
            signature,
            connection: Some(connection),
            pending: false,
        })
    }

    /// Route decision this resource was opened for.
    pub fn decision(&self) -> &RouteDecision {
        &self.decision
    }

    /// Physical table name.
    pub fn physical_table(&self) -> String {
        self.signature.physical_table()
    }

    /// Execute one statement on the connection.
    pub fn execute(&mut self, statement: &Statement) -> Result<StoreOutcome, TransactionError> {
        Ok(self.connection()?.execute(statement)?)
    }

    fn live(&mut self) -> Result<&mut Box<dyn StoreConnection>, StoreError> {
        let describe = self.decision.to_string();
        self.connection
            .as_mut()
            .ok_or_else(|| StoreError::Execution(format!("resource closed: {}", describe)))
    }
}

impl TransactionalResource for ShardResource {
    fn describe(&self) -> String {
        self.decision.to_string()
    }

    fn signature(&self) -> &ShardSignature {
        &self.signature
    }

    fn connection(&mut self) -> Result<&mut dyn StoreConnection, TransactionError> {
        match self.connection.as_mut() {
            Some(conn) => {
                let conn: &mut dyn StoreConnection = conn.as_mut();
                Ok(conn)
            }
            None => Err(TransactionError::ResourceClosed(self.decision.to_string())),
        }
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let result = self.live()?.commit();
        self.pending = false;
        result
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let result = self.live()?.rollback();
        self.pending = false;
        result
    }

    fn close(&mut self) {
        if self.connection.take().is_some() {
            trace!(resource = %self.decision, "[resource] connection released");
        }
    }

    fn is_closed(&self) -> bool {
        self.connection.is_none()
    }
}

impl Drop for ShardResource {
    fn drop(&mut self) {
        if self.pending && !self.is_closed() {
            warn!(resource = %self.decision, "[resource] dropped with an open transaction, rolling back");
            if let Err(e) = self.rollback() {
                warn!(resource = %self.decision, error = %e, "[resource] rollback on drop failed");
            }
        }
        self.close();
    }
}

impl std::fmt::Debug for ShardResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardResource")
            .field("decision", &self.decision.to_string())
            .field("closed", &self.is_closed())
            .field("pending", &self.pending)
            .finish()
    }
}
