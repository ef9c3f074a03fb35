//! # Best-Effort One-Phase Commit
//!
//! A [`Transaction`] collects resources in enlistment order and commits
//! them one by one. There is no prepare phase and no compensation:
//!
//! ```text
//! commit r0 ✓  commit r1 ✓  commit r2 ✗  → rollback r2, r3 ...; close all
//!                                          → PartialCommit { committed: [0, 1], failed: 2 }
//! commit r0 ✗                            → rollback r0 ...;       close all
//!                                          → CommitFailed
//! ```
//!
//! Rollback-only and timeout checks run before the first resource commits,
//! so either of them rolls back everything.

use crate::domain::{TransactionError, TransactionId, TransactionState};
use crate::ports::TransactionalResource;
use shared_types::ShardSignature;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A best-effort one-phase-commit transaction.
pub struct Transaction {
    id: TransactionId,
    state: TransactionState,
    resources: Vec<Box<dyn TransactionalResource>>,
    rollback_only: bool,
    timeout: Option<Duration>,
    started: Instant,
}

impl Transaction {
    /// Create a transaction in `NoTransaction` state.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            id: TransactionId::new(),
            state: TransactionState::NoTransaction,
            resources: Vec::new(),
            rollback_only: false,
            timeout,
            started: Instant::now(),
        }
    }

    /// Transaction id.
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Check for `Active`.
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Number of enlisted resources.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Descriptions of the enlisted resources, in enlistment order.
    pub fn describe_resources(&self) -> Vec<String> {
        self.resources.iter().map(|r| r.describe()).collect()
    }

    /// Start accepting enlistments.
    pub fn begin(&mut self) -> Result<(), TransactionError> {
        self.transition(TransactionState::Active)?;
        self.started = Instant::now();
        debug!(tx_id = %self.id, "[tx] begin");
        Ok(())
    }

    /// Mark the transaction so that `commit` rolls back instead.
    pub fn set_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    /// Check for the rollback-only mark.
    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    /// Replace the timeout. The clock keeps running from `begin`.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Check whether the timeout has elapsed.
    pub fn is_timed_out(&self) -> bool {
        self.timeout
            .map(|timeout| self.started.elapsed() > timeout)
            .unwrap_or(false)
    }

    /// Enlist a resource. Returns its enlistment index.
    ///
    /// A resource whose signature is already enlisted is dropped and the
    /// existing index returned.
    pub fn enlist(
        &mut self,
        resource: Box<dyn TransactionalResource>,
    ) -> Result<usize, TransactionError> {
        self.ensure_active()?;
        if resource.is_closed() {
            return Err(TransactionError::ResourceClosed(resource.describe()));
        }
        if let Some(index) = self.position(resource.signature()) {
            return Ok(index);
        }
        debug!(tx_id = %self.id, resource = %resource.describe(), "[tx] resource enlisted");
        self.resources.push(resource);
        Ok(self.resources.len() - 1)
    }

    /// Enlisted resource for `signature`, opening and enlisting one if needed.
    pub fn enlisted_or_open<F>(
        &mut self,
        signature: &ShardSignature,
        open: F,
    ) -> Result<&mut dyn TransactionalResource, TransactionError>
    where
        F: FnOnce() -> Result<Box<dyn TransactionalResource>, TransactionError>,
    {
        self.ensure_active()?;
        let index = match self.position(signature) {
            Some(index) => index,
            None => self.enlist(open()?)?,
        };
        let resource: &mut dyn TransactionalResource = self.resources[index].as_mut();
        Ok(resource)
    }

    /// Commit every resource in enlistment order.
    pub fn commit(&mut self) -> Result<(), TransactionError> {
        self.ensure_active()?;

        if self.is_timed_out() {
            let elapsed_ms = self.started.elapsed().as_millis() as u64;
            warn!(tx_id = %self.id, elapsed_ms, "[tx] timed out, rolling back");
            self.rollback_all(0);
            self.close_all();
            self.state = TransactionState::RolledBack;
            return Err(TransactionError::Timeout {
                id: self.id,
                elapsed_ms,
            });
        }
        if self.rollback_only {
            info!(tx_id = %self.id, "[tx] rollback-only, rolling back");
            self.rollback_all(0);
            self.close_all();
            self.state = TransactionState::RolledBack;
            return Err(TransactionError::RollbackOnly(self.id));
        }

        self.transition(TransactionState::Committing)?;
        for k in 0..self.resources.len() {
            if let Err(source) = self.resources[k].commit() {
                let resource = self.resources[k].describe();
                warn!(tx_id = %self.id, failed = k, resource = %resource, error = %source, "[tx] commit failed");
                self.rollback_all(k);
                self.close_all();
                return Err(if k == 0 {
                    self.state = TransactionState::RolledBack;
                    TransactionError::CommitFailed {
                        id: self.id,
                        resource,
                        source,
                    }
                } else {
                    self.state = TransactionState::PartiallyCommitted;
                    TransactionError::PartialCommit {
                        id: self.id,
                        committed: (0..k).collect(),
                        failed: k,
                        resource,
                        source,
                    }
                });
            }
        }

        self.close_all();
        self.state = TransactionState::Committed;
        debug!(tx_id = %self.id, resources = self.resources.len(), "[tx] committed");
        Ok(())
    }

    /// Roll back every resource and close them.
    pub fn rollback(&mut self) -> Result<(), TransactionError> {
        self.ensure_active()?;
        self.rollback_all(0);
        self.close_all();
        self.state = TransactionState::RolledBack;
        debug!(tx_id = %self.id, "[tx] rolled back");
        Ok(())
    }

    fn position(&self, signature: &ShardSignature) -> Option<usize> {
        self.resources
            .iter()
            .position(|r| r.signature() == signature)
    }

    fn ensure_active(&self) -> Result<(), TransactionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(TransactionError::NotActive {
                id: self.id,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: TransactionState) -> Result<(), TransactionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransactionError::NotActive {
                id: self.id,
                state: self.state,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Best-effort rollback of resources `from..`.
    fn rollback_all(&mut self, from: usize) {
        for resource in self.resources.iter_mut().skip(from) {
            if resource.is_closed() {
                continue;
            }
            if let Err(e) = resource.rollback() {
                warn!(tx_id = %self.id, resource = %resource.describe(), error = %e, "[tx] rollback failed");
            }
        }
    }

    fn close_all(&mut self) {
        for resource in self.resources.iter_mut() {
            resource.close();
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.is_active() {
            warn!(tx_id = %self.id, "[tx] dropped while active, rolling back");
            self.rollback_all(0);
            self.close_all();
            self.state = TransactionState::RolledBack;
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("resources", &self.describe_resources())
            .field("rollback_only", &self.rollback_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{StoreConnection, StoreError};
    use std::sync::{Arc, Mutex};

    /// Event log shared by mock resources: (resource index, action).
    type Log = Arc<Mutex<Vec<(usize, &'static str)>>>;

    struct MockResource {
        index: usize,
        signature: ShardSignature,
        fail_commit: bool,
        closed: bool,
        log: Log,
    }

    impl MockResource {
        fn boxed(index: usize, fail_commit: bool, log: &Log) -> Box<dyn TransactionalResource> {
            Box::new(Self {
                index,
                signature: ShardSignature::sharded("c1", format!("db{}", index), "t", 0),
                fail_commit,
                closed: false,
                log: Arc::clone(log),
            })
        }
    }

    impl TransactionalResource for MockResource {
        fn describe(&self) -> String {
            format!("mock{}", self.index)
        }

        fn signature(&self) -> &ShardSignature {
            &self.signature
        }

        fn connection(&mut self) -> Result<&mut dyn StoreConnection, TransactionError> {
            Err(TransactionError::ResourceClosed(self.describe()))
        }

        fn commit(&mut self) -> Result<(), StoreError> {
            self.log.lock().unwrap().push((self.index, "commit"));
            if self.fail_commit {
                Err(StoreError::CommitFailed("boom".to_string()))
            } else {
                Ok(())
            }
        }

        fn rollback(&mut self) -> Result<(), StoreError> {
            self.log.lock().unwrap().push((self.index, "rollback"));
            Ok(())
        }

        fn close(&mut self) {
            if !self.closed {
                self.closed = true;
                self.log.lock().unwrap().push((self.index, "close"));
            }
        }

        fn is_closed(&self) -> bool {
            self.closed
        }
    }

    fn active() -> Transaction {
        let mut tx = Transaction::new(None);
        tx.begin().unwrap();
        tx
    }

    fn events(log: &Log, action: &str) -> Vec<usize> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(i, _)| *i)
            .collect()
    }

    #[test]
    fn test_commit_in_enlistment_order() {
        let log = Log::default();
        let mut tx = active();
        for i in 0..3 {
            tx.enlist(MockResource::boxed(i, false, &log)).unwrap();
        }
        tx.commit().unwrap();
        assert_eq!(tx.state(), TransactionState::Committed);
        assert_eq!(events(&log, "commit"), vec![0, 1, 2]);
        assert_eq!(events(&log, "close"), vec![0, 1, 2]);
        assert!(events(&log, "rollback").is_empty());
    }

    #[test]
    fn test_partial_commit() {
        let log = Log::default();
        let mut tx = active();
        tx.enlist(MockResource::boxed(0, false, &log)).unwrap();
        tx.enlist(MockResource::boxed(1, false, &log)).unwrap();
        tx.enlist(MockResource::boxed(2, true, &log)).unwrap();
        tx.enlist(MockResource::boxed(3, false, &log)).unwrap();

        let err = tx.commit().unwrap_err();
        match err {
            TransactionError::PartialCommit {
                committed, failed, ..
            } => {
                assert_eq!(committed, vec![0, 1]);
                assert_eq!(failed, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(tx.state(), TransactionState::PartiallyCommitted);
        assert_eq!(events(&log, "commit"), vec![0, 1, 2]);
        assert_eq!(events(&log, "rollback"), vec![2, 3]);
        assert_eq!(events(&log, "close"), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_first_resource_failure_is_full_failure() {
        let log = Log::default();
        let mut tx = active();
        tx.enlist(MockResource::boxed(0, true, &log)).unwrap();
        tx.enlist(MockResource::boxed(1, false, &log)).unwrap();

        assert!(matches!(
            tx.commit(),
            Err(TransactionError::CommitFailed { .. })
        ));
        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert_eq!(events(&log, "rollback"), vec![0, 1]);
    }

    #[test]
    fn test_enlist_dedups_by_signature() {
        let log = Log::default();
        let mut tx = active();
        assert_eq!(tx.enlist(MockResource::boxed(0, false, &log)).unwrap(), 0);
        assert_eq!(tx.enlist(MockResource::boxed(1, false, &log)).unwrap(), 1);
        assert_eq!(tx.enlist(MockResource::boxed(0, false, &log)).unwrap(), 0);
        assert_eq!(tx.resource_count(), 2);
    }

    #[test]
    fn test_enlisted_or_open_reuses() {
        let log = Log::default();
        let mut tx = active();
        let sig = ShardSignature::sharded("c1", "db0", "t", 0);
        tx.enlisted_or_open(&sig, || Ok(MockResource::boxed(0, false, &log)))
            .unwrap();
        let reused = tx
            .enlisted_or_open(&sig, || panic!("must not open twice"))
            .unwrap();
        assert_eq!(reused.describe(), "mock0");
        assert_eq!(tx.resource_count(), 1);
    }

    #[test]
    fn test_enlist_closed_resource_rejected() {
        let log = Log::default();
        let mut tx = active();
        let mut res = MockResource::boxed(0, false, &log);
        res.close();
        assert!(matches!(
            tx.enlist(res),
            Err(TransactionError::ResourceClosed(_))
        ));
    }

    #[test]
    fn test_enlist_requires_active() {
        let log = Log::default();
        let mut tx = Transaction::new(None);
        assert!(matches!(
            tx.enlist(MockResource::boxed(0, false, &log)),
            Err(TransactionError::NotActive {
                state: TransactionState::NoTransaction,
                ..
            })
        ));

        let mut tx = active();
        tx.commit().unwrap();
        assert!(tx.enlist(MockResource::boxed(0, false, &log)).is_err());
        assert!(tx.commit().is_err());
    }

    #[test]
    fn test_rollback_only() {
        let log = Log::default();
        let mut tx = active();
        tx.enlist(MockResource::boxed(0, false, &log)).unwrap();
        tx.set_rollback_only();
        assert!(matches!(tx.commit(), Err(TransactionError::RollbackOnly(_))));
        assert!(events(&log, "commit").is_empty());
        assert_eq!(events(&log, "rollback"), vec![0]);
        assert_eq!(tx.state(), TransactionState::RolledBack);
    }

    #[test]
    fn test_timeout_rolls_back() {
        let log = Log::default();
        let mut tx = Transaction::new(Some(Duration::from_millis(5)));
        tx.begin().unwrap();
        tx.enlist(MockResource::boxed(0, false, &log)).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(matches!(tx.commit(), Err(TransactionError::Timeout { .. })));
        assert!(events(&log, "commit").is_empty());
    }

    #[test]
    fn test_explicit_rollback_and_drop() {
        let log = Log::default();
        let mut tx = active();
        tx.enlist(MockResource::boxed(0, false, &log)).unwrap();
        tx.rollback().unwrap();
        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert!(tx.rollback().is_err());

        let log2 = Log::default();
        {
            let mut tx = active();
            tx.enlist(MockResource::boxed(5, false, &log2)).unwrap();
        }
        assert_eq!(events(&log2, "rollback"), vec![5]);
        assert_eq!(events(&log2, "close"), vec![5]);
    }
}
