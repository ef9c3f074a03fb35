//! # Tessera Subsystem Benchmarks
//!
//! Hot paths of a storage call:
//!
//! | Subsystem | Path |
//! |-----------|------|
//! | ts-01 Routing | key → region, endpoint, table |
//! | ts-02 Id Generation | buffered `gen_id` |
//! | ts-03 Cache | L1 row get/put over the in-memory transport |
//! | ts-06 Data Layer | cached `find_by_pk` |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{PkValue, Row, ShardSignature, ShardingKey};
use std::sync::Arc;
use std::time::Duration;
use ts_01_routing::{HashAlgorithm, ReadTarget, RouterConfig, ShardRouter};
use ts_02_id_generation::{CoordinationClient, IdGenerator, IdGeneratorConfig, InMemoryCoordinator};
use ts_03_cache::{
    CacheConfig, CacheScope, CacheTransport, InMemoryCacheTransport, PrimaryCache,
    TransportPrimaryCache,
};
use ts_tests::fixtures::{self, key, CLUSTER};

// ============================================================================
// TS-01: Routing
// ============================================================================

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("ts-01-routing");
    group.measurement_time(Duration::from_secs(5));

    let (topology, _stores) = fixtures::topology();
    for algorithm in [HashAlgorithm::Bernstein, HashAlgorithm::Fnv1a, HashAlgorithm::Keccak] {
        let router = ShardRouter::new(
            Arc::clone(&topology),
            RouterConfig::default().with_hash_algorithm(algorithm),
        );
        group.bench_with_input(
            BenchmarkId::new("route_text_key", format!("{:?}", algorithm)),
            &router,
            |b, router| {
                let key = ShardingKey::new(CLUSTER, "user-4711");
                b.iter(|| black_box(router.route(&key, "user", ReadTarget::Master, 16).is_ok()))
            },
        );
    }

    let router = ShardRouter::new(Arc::clone(&topology), RouterConfig::default());
    group.bench_function("route_int_key", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let key = ShardingKey::new(CLUSTER, rng.gen_range(0..i64::MAX));
            black_box(router.route(&key, "user", ReadTarget::Master, 16).is_ok())
        })
    });

    group.finish();
}

// ============================================================================
// TS-02: Id Generation
// ============================================================================

fn bench_id_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ts-02-id-generation");

    for batch in [10usize, 100, 1000] {
        let coordinator: Arc<dyn CoordinationClient> = Arc::new(InMemoryCoordinator::new());
        let generator = IdGenerator::new(
            coordinator,
            IdGeneratorConfig::for_testing().with_batch_size(batch),
        )
        .expect("valid id config");
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("gen_id", batch), &generator, |b, g| {
            b.iter(|| black_box(g.gen_id(CLUSTER, "user").is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// TS-03: Cache
// ============================================================================

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("ts-03-cache");

    let transport: Arc<dyn CacheTransport> = Arc::new(InMemoryCacheTransport::new(100_000));
    let l1 = TransportPrimaryCache::new(transport, &CacheConfig::default());
    let scope = CacheScope::shard(ShardSignature::sharded(CLUSTER, "db0", "user", 3));
    let row = Row::new()
        .with("id", 42i64)
        .with("name", "benchmark user")
        .with("payload", vec![0u8; 256]);
    l1.put(&scope, &PkValue::Int(42), &row).expect("cache put");

    group.bench_function("l1_get_hit", |b| {
        b.iter(|| black_box(l1.get(&scope, &PkValue::Int(42)).is_ok()))
    });
    group.bench_function("l1_put", |b| {
        b.iter(|| black_box(l1.put(&scope, &PkValue::Int(43), &row).is_ok()))
    });

    group.finish();
}

// ============================================================================
// TS-06: Data Layer
// ============================================================================

fn bench_data_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ts-06-data-layer");

    let h = fixtures::harness();
    let pk = h
        .storage
        .save("user", &key(7), Row::new().with("name", "bench"), None)
        .expect("seed row");

    for use_cache in [true, false] {
        group.bench_with_input(
            BenchmarkId::new("find_by_pk", if use_cache { "cached" } else { "store" }),
            &use_cache,
            |b, use_cache| {
                b.iter(|| {
                    black_box(
                        h.storage
                            .find_by_pk("user", &key(7), &pk, ReadTarget::Master, *use_cache)
                            .is_ok(),
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_routing,
    bench_id_generation,
    bench_cache,
    bench_data_layer
);
criterion_main!(benches);
