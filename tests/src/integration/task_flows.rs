//! # Task Scenarios
//!
//! Record iterators and the task executor over rows written through the
//! storage facade.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, key, Harness};
    use parking_lot::Mutex;
    use rand::seq::SliceRandom;
    use shared_types::{Condition, Query, Row};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use ts_05_task_executor::{RecordTask, TaskError};
    use ts_06_data_layer::EntityKey;

    /// Collects every primary key it sees.
    #[derive(Default)]
    struct Collect {
        ids: Mutex<Vec<i64>>,
        batches: AtomicU64,
        finished: AtomicU64,
        batch_size: Option<u64>,
    }

    impl RecordTask for Collect {
        fn batch_size(&self) -> Option<u64> {
            self.batch_size
        }

        fn process_batch(&self, rows: &[Row]) -> Result<(), TaskError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            self.ids
                .lock()
                .extend(rows.iter().filter_map(|r| r.get("id").and_then(|v| v.as_i64())));
            Ok(())
        }

        fn finish(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn seed_users(h: &Harness, per_key: &[(i64, usize)]) -> usize {
        let mut total = 0;
        for (k, n) in per_key {
            let rows = (0..*n)
                .map(|i| Row::new().with("name", format!("u{}-{}", k, i)).with("even", (i % 2 == 0) as i64))
                .collect();
            h.storage.save_batch("user", &key(*k), rows, None).unwrap();
            total += n;
        }
        total
    }

    #[test]
    fn test_iterator_walks_one_shard() {
        let h = fixtures::harness();
        seed_users(&h, &[(5, 23)]);

        let mut iter = h.storage.iterator("user", &key(5), None, Some(4)).unwrap();
        assert_eq!(iter.count().unwrap(), 23);

        let mut seen = Vec::new();
        while iter.has_next().unwrap() {
            let batch = iter.next_batch().unwrap();
            assert!(!batch.is_empty() && batch.len() <= 4);
            seen.extend(batch.iter().filter_map(|r| r.get("id").and_then(|v| v.as_i64())));
        }
        assert_eq!(seen.len(), 23);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(iter.next_batch().unwrap().is_empty());
    }

    #[test]
    fn test_iterator_with_filter() {
        let h = fixtures::harness();
        seed_users(&h, &[(5, 10)]);
        let filter = Query::new().and(Condition::eq("even", 1i64));
        let mut iter = h
            .storage
            .iterator("user", &key(5), Some(filter), None)
            .unwrap();
        assert_eq!(iter.count().unwrap(), 5);
        let mut n = 0;
        while iter.has_next().unwrap() {
            n += iter.next_batch().unwrap().len();
        }
        assert_eq!(n, 5);
    }

    #[test]
    fn test_executor_visits_every_shard_once() {
        let h = fixtures::harness();
        let mut keys: Vec<i64> = (0..100).collect();
        keys.shuffle(&mut rand::thread_rng());
        let spread: Vec<(i64, usize)> = keys.iter().take(12).map(|k| (*k, 3)).collect();
        let total = seed_users(&h, &spread);

        let task = Arc::new(Collect {
            batch_size: Some(2),
            ..Collect::default()
        });
        let handle = h
            .storage
            .execute_task("user", Arc::clone(&task) as Arc<dyn RecordTask>, None)
            .unwrap();
        assert!(handle.wait_timeout(Duration::from_secs(10)));

        assert_eq!(handle.total(), total as u64);
        assert_eq!(handle.processed(), total as u64);
        assert_eq!(handle.remaining(), 0);
        assert_eq!(handle.failed_batches(), 0);
        assert_eq!(task.finished.load(Ordering::SeqCst), 1);

        let ids = task.ids.lock();
        let distinct: HashSet<&i64> = ids.iter().collect();
        assert_eq!(ids.len(), total);
        assert_eq!(distinct.len(), total);
    }

    #[test]
    fn test_executor_over_global_entity() {
        let h = fixtures::harness();
        let rows = (0..7).map(|i| Row::new().with("code", format!("C{}", i))).collect();
        h.storage
            .save_batch("country", &EntityKey::Global, rows, None)
            .unwrap();

        let task = Arc::new(Collect::default());
        let handle = h
            .storage
            .execute_task("country", Arc::clone(&task) as Arc<dyn RecordTask>, None)
            .unwrap();
        handle.wait();
        assert_eq!(handle.processed(), 7);
        assert_eq!(task.ids.lock().len(), 7);
    }

    #[test]
    fn test_executor_over_empty_entity_completes() {
        let h = fixtures::harness();
        let task = Arc::new(Collect::default());
        let handle = h
            .storage
            .execute_task("audit", Arc::clone(&task) as Arc<dyn RecordTask>, None)
            .unwrap();
        assert!(handle.wait_timeout(Duration::from_secs(5)));
        assert_eq!(handle.total(), 0);
        assert_eq!(task.batches.load(Ordering::SeqCst), 0);
        assert_eq!(task.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_executor_async_wait() {
        let h = fixtures::harness();
        let total = seed_users(&h, &[(1, 5), (51, 5)]);
        let task = Arc::new(Collect::default());
        let handle = h
            .storage
            .execute_task("user", Arc::clone(&task) as Arc<dyn RecordTask>, None)
            .unwrap();
        tokio::time::timeout(Duration::from_secs(10), handle.wait_async())
            .await
            .unwrap();
        assert_eq!(handle.processed(), total as u64);
    }
}
