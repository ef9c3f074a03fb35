//! # Transaction Coordinator Service
//!
//! Entry point for everything that touches a shard store.
//!
//! Every statement runs in one of two modes:
//!
//! | Mode | Resource | Finish |
//! |------|----------|--------|
//! | Autocommit (`tx = None`) | opened for this call | commit, or rollback on error, then close |
//! | Transactional (`tx = Some`) | enlisted once per physical table | deferred to [`Transaction::commit`] |

use crate::algorithms::Transaction;
use crate::adapters::ShardResource;
use crate::config::TransactionConfig;
use crate::domain::TransactionError;
use crate::ports::TransactionalResource;
use shared_types::{StoreConnection, StoreError};
use tracing::{debug, warn};
use ts_01_routing::RouteDecision;

/// Begins transactions and runs statements against route decisions.
#[derive(Debug, Clone, Default)]
pub struct TransactionCoordinator {
    config: TransactionConfig,
}

impl TransactionCoordinator {
    /// Create a coordinator.
    pub fn new(config: TransactionConfig) -> Result<Self, TransactionError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Begin a transaction with the configured timeout.
    pub fn begin(&self) -> Result<Transaction, TransactionError> {
        let mut tx = Transaction::new(self.config.timeout);
        tx.begin()?;
        Ok(tx)
    }

    /// Run `work` on the connection for `decision`.
    ///
    /// With a transaction the resource is enlisted (or reused) and stays
    /// open until the transaction finishes. Without one the resource is
    /// committed, or rolled back if `work` fails, and closed before return.
    pub fn execute<T, F>(
        &self,
        tx: Option<&mut Transaction>,
        decision: RouteDecision,
        work: F,
    ) -> Result<T, TransactionError>
    where
        F: FnOnce(&mut dyn StoreConnection) -> Result<T, StoreError>,
    {
        match tx {
            Some(tx) => {
                let signature = decision.signature();
                let resource = tx.enlisted_or_open(&signature, move || {
                    let resource: Box<dyn TransactionalResource> =
                        Box::new(ShardResource::open(decision)?);
                    Ok(resource)
                })?;
                Ok(work(resource.connection()?)?)
            }
            None => self.autocommit(decision, work),
        }
    }

    /// Run read-only `work` on the connection for `decision`.
    ///
    /// Inside a transaction this behaves like [`execute`](Self::execute) so
    /// the read sees the transaction's own writes. Outside one the
    /// connection stays in autocommit mode.
    pub fn read<T, F>(
        &self,
        tx: Option<&mut Transaction>,
        decision: RouteDecision,
        work: F,
    ) -> Result<T, TransactionError>
    where
        F: FnOnce(&mut dyn StoreConnection) -> Result<T, StoreError>,
    {
        match tx {
            Some(tx) => self.execute(Some(tx), decision, work),
            None => {
                let mut resource = ShardResource::connect(decision)?;
                let result = work(resource.connection()?);
                resource.close();
                Ok(result?)
            }
        }
    }

    fn autocommit<T, F>(&self, decision: RouteDecision, work: F) -> Result<T, TransactionError>
    where
        F: FnOnce(&mut dyn StoreConnection) -> Result<T, StoreError>,
    {
        let mut resource = ShardResource::open(decision)?;
        let result = work(resource.connection()?);
        let outcome = match result {
            Ok(value) => match resource.commit() {
                Ok(()) => Ok(value),
                Err(e) => {
                    warn!(resource = %resource.describe(), error = %e, "[tx] autocommit failed");
                    Err(TransactionError::Store(e))
                }
            },
            Err(e) => {
                debug!(resource = %resource.describe(), error = %e, "[tx] autocommit statement failed, rolling back");
                if let Err(rollback) = resource.rollback() {
                    warn!(resource = %resource.describe(), error = %rollback, "[tx] rollback failed");
                }
                Err(TransactionError::Store(e))
            }
        };
        resource.close();
        outcome
    }
}
