//! # Storage Facade Scenarios
//!
//! The data layer over routing, ids and both cache levels:
//! - writes land on the key's master table and keep L1 counts current
//! - reads go through L1/L2 and fall back from an empty slave to the master
//! - keys that disagree with the entity descriptor are rejected

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, key, Harness, CLUSTER};
    use shared_types::{Condition, PkValue, Query, Row, ShardSignature, Value};
    use std::sync::Arc;
    use ts_01_routing::ReadTarget;
    use ts_03_cache::{
        CacheConfig, CacheScope, CacheTransport, PrimaryCache, TransportPrimaryCache,
    };
    use ts_06_data_layer::{DataLayerError, EntityKey};

    fn user(name: &str) -> Row {
        Row::new().with("name", name)
    }

    fn save_users(h: &Harness, k: i64, names: &[&str]) -> Vec<PkValue> {
        h.storage
            .save_batch("user", &key(k), names.iter().map(|n| user(n)).collect(), None)
            .unwrap()
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    #[test]
    fn test_save_lands_on_routed_master_table() {
        let h = fixtures::harness();
        // 37 → region 0, table 37 mod 4 = 1; 61 → region 1, table 1.
        save_users(&h, 37, &["ann", "bob"]);
        save_users(&h, 61, &["cy"]);

        assert_eq!(h.stores.masters[0].row_count("user_1"), 2);
        assert_eq!(h.stores.masters[1].row_count("user_1"), 1);
        assert_eq!(h.stores.slaves[0].row_count("user_1"), 0);
    }

    #[test]
    fn test_generated_ids_are_unique_across_shards() {
        let h = fixtures::harness();
        let mut pks = save_users(&h, 3, &["a", "b", "c"]);
        pks.extend(save_users(&h, 90, &["d", "e"]));
        pks.push(h.storage.save("user", &key(12), user("f"), None).unwrap());
        let mut ids: Vec<i64> = pks.iter().filter_map(PkValue::as_i64).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_update_and_remove_refresh_cache() {
        let h = fixtures::harness();
        let pk = save_users(&h, 5, &["old"]).remove(0);
        let read = |h: &Harness| {
            h.storage
                .find_by_pk("user", &key(5), &pk, ReadTarget::Master, true)
                .unwrap()
        };
        assert_eq!(read(&h).unwrap().get("name"), Some(&Value::from("old")));

        let updated = Row::new().with("id", pk.as_i64().unwrap()).with("name", "new");
        assert_eq!(h.storage.update("user", &key(5), updated, None).unwrap(), 1);
        assert_eq!(read(&h).unwrap().get("name"), Some(&Value::from("new")));

        assert_eq!(h.storage.remove_by_pk("user", &key(5), &pk, None).unwrap(), 1);
        assert!(read(&h).is_none());
        assert_eq!(h.storage.remove_by_pk("user", &key(5), &pk, None).unwrap(), 0);
    }

    #[test]
    fn test_update_without_primary_key_rejected() {
        let h = fixtures::harness();
        assert!(matches!(
            h.storage.update("user", &key(5), user("x"), None),
            Err(DataLayerError::MissingPrimaryKey { .. })
        ));
    }

    // =========================================================================
    // CACHES
    // =========================================================================

    #[test]
    fn test_count_cache_arithmetic() {
        let h = fixtures::harness();
        let l1 = TransportPrimaryCache::new(
            Arc::clone(&h.transport) as Arc<dyn CacheTransport>,
            &CacheConfig::default(),
        );
        let scope = CacheScope::shard(ShardSignature::sharded(CLUSTER, "db0", "user", 1));
        l1.set_count(&scope, 10).unwrap();
        l1.incr_count(&scope, 1).unwrap();
        l1.decr_count(&scope, 2).unwrap();
        assert_eq!(l1.get_count(&scope).unwrap(), Some(9));
    }

    #[test]
    fn test_cached_count_follows_writes() {
        let h = fixtures::harness();
        save_users(&h, 37, &["a", "b", "c"]);
        assert_eq!(h.storage.count("user", &key(37), ReadTarget::Master, true).unwrap(), 3);

        let pks = save_users(&h, 37, &["d"]);
        assert_eq!(h.storage.count("user", &key(37), ReadTarget::Master, true).unwrap(), 4);

        h.storage.remove_by_pks("user", &key(37), &pks, None).unwrap();
        assert_eq!(h.storage.count("user", &key(37), ReadTarget::Master, true).unwrap(), 3);

        // Key 41 shares region 0, table 1 and therefore the cached count.
        assert_eq!(h.storage.count("user", &key(41), ReadTarget::Master, true).unwrap(), 3);
    }

    #[test]
    fn test_find_by_pks_merges_cache_and_store_in_request_order() {
        let h = fixtures::harness();
        let pks = save_users(&h, 8, &["a", "b", "c", "d"]);

        // Warm two of the four rows.
        h.storage
            .find_by_pk("user", &key(8), &pks[1], ReadTarget::Master, true)
            .unwrap();
        h.storage
            .find_by_pk("user", &key(8), &pks[3], ReadTarget::Master, true)
            .unwrap();

        let request = vec![
            pks[3].clone(),
            PkValue::Int(999_999),
            pks[0].clone(),
            pks[1].clone(),
            pks[2].clone(),
        ];
        let rows = h
            .storage
            .find_by_pks("user", &key(8), &request, ReadTarget::Master, true)
            .unwrap();
        let names: Vec<&Value> = rows.iter().filter_map(|r| r.get("name")).collect();
        assert_eq!(
            names,
            vec![
                &Value::from("d"),
                &Value::from("a"),
                &Value::from("b"),
                &Value::from("c")
            ]
        );
    }

    #[test]
    fn test_query_cache_invalidated_by_writes() {
        let h = fixtures::harness();
        save_users(&h, 20, &["ann", "bob"]);
        let query = Query::new().and(Condition::eq("name", "ann"));
        let find = |h: &Harness| {
            h.storage
                .find_by_query("user", &key(20), &query, ReadTarget::Master, true)
                .unwrap()
                .len()
        };
        assert_eq!(find(&h), 1);

        // A write anywhere in the logical table drops cached results.
        save_users(&h, 60, &["ann"]);
        save_users(&h, 20, &["ann"]);
        assert_eq!(find(&h), 2);
    }

    #[test]
    fn test_non_cacheable_entity_skips_cache() {
        let h = fixtures::harness();
        let pk = h
            .storage
            .save("audit", &key(2), Row::new().with("event", "login"), None)
            .unwrap();
        h.storage
            .find_by_pk("audit", &key(2), &pk, ReadTarget::Master, true)
            .unwrap();
        assert_eq!(h.transport.stats().entries, 0);
    }

    #[test]
    fn test_cache_outage_is_transparent() {
        let h = fixtures::harness();
        h.transport.set_available(false);
        let pk = save_users(&h, 9, &["zoe"]).remove(0);
        assert!(h
            .storage
            .find_by_pk("user", &key(9), &pk, ReadTarget::Master, true)
            .unwrap()
            .is_some());
        assert_eq!(h.storage.count("user", &key(9), ReadTarget::Master, true).unwrap(), 1);
    }

    // =========================================================================
    // SLAVE FALLBACK
    // =========================================================================

    #[test]
    fn test_slave_reads_fall_back_to_master() {
        let h = fixtures::harness();
        let pks = save_users(&h, 70, &["a", "b"]);

        let row = h
            .storage
            .find_by_pk("user", &key(70), &pks[0], ReadTarget::Slave(0), false)
            .unwrap();
        assert!(row.is_some());

        let rows = h
            .storage
            .find_by_pks("user", &key(70), &pks, ReadTarget::Slave(0), false)
            .unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(h.storage.count("user", &key(70), ReadTarget::Slave(0), false).unwrap(), 2);
        assert_eq!(h.storage.count_all("user", ReadTarget::Slave(0), false).unwrap(), 2);
    }

    #[test]
    fn test_slave_rows_served_when_present() {
        let h = fixtures::harness();
        // Replicated row that differs from the master copy.
        h.stores.slaves[1].insert_rows(
            "user_2",
            "id",
            vec![Row::new().with("id", 5i64).with("name", "replica")],
        );
        let row = h
            .storage
            .find_by_pk("user", &key(70), &PkValue::Int(5), ReadTarget::Slave(0), false)
            .unwrap()
            .unwrap();
        assert_eq!(row.get("name"), Some(&Value::from("replica")));
    }

    // =========================================================================
    // GLOBAL ENTITIES AND KEY CHECKS
    // =========================================================================

    #[test]
    fn test_global_entity_round_trip() {
        let h = fixtures::harness();
        let pk = h
            .storage
            .save("country", &EntityKey::Global, Row::new().with("code", "NZ"), None)
            .unwrap();
        assert_eq!(h.stores.global.row_count("country"), 1);
        assert!(h
            .storage
            .find_by_pk("country", &EntityKey::Global, &pk, ReadTarget::Master, true)
            .unwrap()
            .is_some());
        assert_eq!(h.storage.count_all("country", ReadTarget::Master, true).unwrap(), 1);
    }

    #[test]
    fn test_key_mismatch_rejected() {
        let h = fixtures::harness();
        assert!(matches!(
            h.storage.save("user", &EntityKey::Global, user("x"), None),
            Err(DataLayerError::KeyMismatch { .. })
        ));
        assert!(matches!(
            h.storage.find_by_pk("country", &key(1), &PkValue::Int(1), ReadTarget::Master, true),
            Err(DataLayerError::KeyMismatch { .. })
        ));
        assert_eq!(h.stores.masters[0].statements_executed(), 0);
        assert_eq!(h.stores.global.statements_executed(), 0);
    }

    #[test]
    fn test_unknown_slave_index_is_routing_error() {
        let h = fixtures::harness();
        assert!(matches!(
            h.storage.count("user", &key(1), ReadTarget::Slave(3), false),
            Err(DataLayerError::Routing(_))
        ));
    }

    #[test]
    fn test_shutdown_closes_pools() {
        let h = fixtures::harness();
        save_users(&h, 1, &["a"]);
        h.storage
            .find_by_query("user", &key(1), &Query::new(), ReadTarget::Master, true)
            .unwrap();
        assert!(h.transport.stats().entries > 0);

        h.storage.shutdown();
        assert_eq!(h.transport.stats().entries, 0);
        assert!(matches!(
            h.storage.count("user", &key(1), ReadTarget::Master, false),
            Err(DataLayerError::Store(_))
        ));
    }
}
