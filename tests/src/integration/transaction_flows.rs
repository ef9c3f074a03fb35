//! # Transaction Scenarios
//!
//! Best-effort one-phase commit across shards of the fixture cluster,
//! driven through the storage facade.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, key};
    use shared_types::{PkValue, Row};
    use std::time::Duration;
    use ts_01_routing::ReadTarget;
    use ts_04_transactions::{TransactionError, TransactionState};
    use ts_06_data_layer::{DataLayerError, EntityKey};

    fn row(id: i64) -> Row {
        Row::new().with("id", id).with("name", format!("row-{}", id))
    }

    #[test]
    fn test_commit_spans_regions_and_global() {
        let h = fixtures::harness();
        let mut tx = h.storage.begin().unwrap();
        h.storage.save("user", &key(10), row(1), Some(&mut tx)).unwrap();
        h.storage.save("user", &key(60), row(2), Some(&mut tx)).unwrap();
        h.storage
            .save("country", &EntityKey::Global, row(3), Some(&mut tx))
            .unwrap();
        assert_eq!(tx.resource_count(), 3);

        // Nothing is visible until commit.
        assert_eq!(h.stores.masters[0].row_count("user_2"), 0);
        h.storage.commit(&mut tx).unwrap();

        assert_eq!(tx.state(), TransactionState::Committed);
        assert_eq!(h.stores.masters[0].row_count("user_2"), 1);
        assert_eq!(h.stores.masters[1].row_count("user_0"), 1);
        assert_eq!(h.stores.global.row_count("country"), 1);
    }

    #[test]
    fn test_same_shard_enlisted_once() {
        let h = fixtures::harness();
        let mut tx = h.storage.begin().unwrap();
        // 2 and 42 share region 0, table 2.
        h.storage.save("user", &key(2), row(1), Some(&mut tx)).unwrap();
        h.storage.save("user", &key(42), row(2), Some(&mut tx)).unwrap();
        h.storage
            .update("user", &key(2), row(1).with("name", "renamed"), Some(&mut tx))
            .unwrap();
        assert_eq!(tx.resource_count(), 1);
        h.storage.commit(&mut tx).unwrap();
        assert_eq!(h.stores.masters[0].row_count("user_2"), 2);
    }

    #[test]
    fn test_partial_commit_reports_committed_indices() {
        let h = fixtures::harness();
        let mut tx = h.storage.begin().unwrap();
        h.storage.save("user", &key(10), row(1), Some(&mut tx)).unwrap();
        h.storage.save("user", &key(60), row(2), Some(&mut tx)).unwrap();
        h.stores.masters[1].fail_next_commits(1);

        let err = h.storage.commit(&mut tx).unwrap_err();
        assert!(matches!(
            err,
            DataLayerError::Transaction(TransactionError::PartialCommit { .. })
        ));
        assert_eq!(err.committed_indices(), &[0usize]);
        assert_eq!(tx.state(), TransactionState::PartiallyCommitted);

        assert_eq!(h.stores.masters[0].row_count("user_2"), 1);
        assert_eq!(h.stores.masters[1].row_count("user_0"), 0);
    }

    #[test]
    fn test_first_commit_failure_rolls_back_everything() {
        let h = fixtures::harness();
        let mut tx = h.storage.begin().unwrap();
        h.storage.save("user", &key(10), row(1), Some(&mut tx)).unwrap();
        h.storage.save("user", &key(60), row(2), Some(&mut tx)).unwrap();
        h.stores.masters[0].fail_next_commits(1);

        let err = h.storage.commit(&mut tx).unwrap_err();
        assert!(matches!(
            err,
            DataLayerError::Transaction(TransactionError::CommitFailed { .. })
        ));
        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert_eq!(h.stores.masters[0].row_count("user_2"), 0);
        assert_eq!(h.stores.masters[1].row_count("user_0"), 0);
    }

    #[test]
    fn test_rollback_discards_writes_and_ends_transaction() {
        let h = fixtures::harness();
        let mut tx = h.storage.begin().unwrap();
        h.storage.save("user", &key(10), row(7), Some(&mut tx)).unwrap();
        h.storage.rollback(&mut tx).unwrap();

        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert!(h
            .storage
            .find_by_pk("user", &key(10), &PkValue::Int(7), ReadTarget::Master, false)
            .unwrap()
            .is_none());
        assert!(matches!(
            h.storage.save("user", &key(10), row(8), Some(&mut tx)),
            Err(DataLayerError::Transaction(TransactionError::NotActive { .. }))
        ));
    }

    #[test]
    fn test_failed_statement_dooms_transaction() {
        let h = fixtures::harness();
        h.storage.save("user", &key(10), row(1), None).unwrap();

        let mut tx = h.storage.begin().unwrap();
        h.storage.save("user", &key(60), row(2), Some(&mut tx)).unwrap();
        let dup = h.storage.save("user", &key(10), row(1), Some(&mut tx));
        assert!(matches!(dup, Err(DataLayerError::Store(_))));
        assert!(tx.is_rollback_only());

        assert!(matches!(
            h.storage.commit(&mut tx),
            Err(DataLayerError::Transaction(TransactionError::RollbackOnly(_)))
        ));
        assert_eq!(h.stores.masters[1].row_count("user_0"), 0);
    }

    #[test]
    fn test_timed_out_transaction_rolls_back() {
        let h = fixtures::harness();
        let mut tx = h.storage.begin().unwrap();
        tx.set_timeout(Some(Duration::from_millis(5)));
        h.storage.save("user", &key(10), row(1), Some(&mut tx)).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert!(matches!(
            h.storage.commit(&mut tx),
            Err(DataLayerError::Transaction(TransactionError::Timeout { .. }))
        ));
        assert_eq!(h.stores.masters[0].row_count("user_2"), 0);
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let h = fixtures::harness();
        {
            let mut tx = h.storage.begin().unwrap();
            h.storage.save("user", &key(10), row(1), Some(&mut tx)).unwrap();
        }
        assert_eq!(h.stores.masters[0].row_count("user_2"), 0);
    }
}
