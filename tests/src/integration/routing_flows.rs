//! # Routing and Id Scenarios
//!
//! Router decisions against the fixture cluster and id allocation shared by
//! two generator instances.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, CLUSTER};
    use proptest::prelude::*;
    use shared_types::ShardingKey;
    use std::collections::HashSet;
    use std::sync::Arc;
    use ts_01_routing::{ReadTarget, RouterConfig, ShardRouter};
    use ts_02_id_generation::{CoordinationClient, IdGenerator, IdGeneratorConfig, InMemoryCoordinator};

    fn router() -> ShardRouter {
        let (topology, _stores) = fixtures::topology();
        ShardRouter::new(topology, RouterConfig::default())
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    #[test]
    fn test_key_37_routes_to_region_0_table_1() {
        let router = router();
        let decision = router
            .route(&ShardingKey::new(CLUSTER, 37i64), "t", ReadTarget::Master, 4)
            .unwrap();
        assert_eq!(decision.region_index, Some(0));
        assert_eq!(decision.table_index, Some(1));
        assert_eq!(decision.endpoint.name, "m0");
        assert_eq!(decision.physical_table(), "t_1");
    }

    #[test]
    fn test_slave_route_shares_region_and_table() {
        let router = router();
        let key = ShardingKey::new(CLUSTER, 77i64);
        let master = router.route(&key, "t", ReadTarget::Master, 4).unwrap();
        let slave = router.route(&key, "t", ReadTarget::Slave(0), 4).unwrap();
        assert_eq!(master.region_index, Some(1));
        assert_eq!(slave.region_index, master.region_index);
        assert_eq!(slave.table_index, master.table_index);
        assert_eq!(slave.endpoint.name, "s1");
        assert!(router.route(&key, "t", ReadTarget::Slave(1), 4).is_err());
    }

    #[test]
    fn test_fan_out_covers_every_table() {
        let router = router();
        let shards = router.all_master_shards(CLUSTER, "user", 4).unwrap();
        assert_eq!(shards.len(), 8);
        let distinct: HashSet<String> = shards.iter().map(|d| d.to_string()).collect();
        assert_eq!(distinct.len(), 8);
    }

    proptest! {
        #[test]
        fn prop_route_is_deterministic_and_in_range(v in 0i64..i64::MAX) {
            let router = router();
            let key = ShardingKey::new(CLUSTER, v);
            let a = router.route(&key, "t", ReadTarget::Master, 4).unwrap();
            let b = router.route(&key, "t", ReadTarget::Master, 4).unwrap();
            prop_assert_eq!(&a, &b);
            let hash = (v as u64) % 100;
            prop_assert_eq!(a.region_index, Some(if hash < 50 { 0 } else { 1 }));
            prop_assert_eq!(a.table_index, Some((hash % 4) as usize));
        }
    }

    // =========================================================================
    // ID GENERATION
    // =========================================================================

    #[test]
    fn test_two_generators_share_one_counter() {
        let coordinator: Arc<dyn CoordinationClient> = Arc::new(InMemoryCoordinator::new());
        let first = IdGenerator::new(Arc::clone(&coordinator), IdGeneratorConfig::for_testing()).unwrap();
        let second = IdGenerator::new(coordinator, IdGeneratorConfig::for_testing()).unwrap();

        assert_eq!(first.gen_id_batch(CLUSTER, "seq", 5).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(second.gen_id_batch(CLUSTER, "seq", 5).unwrap(), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let coordinator: Arc<dyn CoordinationClient> = Arc::new(InMemoryCoordinator::new());
        let config = IdGeneratorConfig::for_testing().with_batch_size(7);
        let generators: Vec<Arc<IdGenerator>> = (0..3)
            .map(|_| Arc::new(IdGenerator::new(Arc::clone(&coordinator), config.clone()).unwrap()))
            .collect();

        let handles: Vec<_> = generators
            .iter()
            .flat_map(|g| (0..2).map(move |_| Arc::clone(g)))
            .map(|g| {
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| g.gen_id(CLUSTER, "user").unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let ids = handle.join().unwrap();
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            for id in ids {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 300);
    }
}
