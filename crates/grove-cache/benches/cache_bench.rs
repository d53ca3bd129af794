//! Soft cache benchmarks.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grove_cache::{CacheConfig, SoftCache};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn soft_insert_benchmark(c: &mut Criterion) {
    c.bench_function("soft_insert_1000", |b| {
        b.iter(|| {
            let cache = SoftCache::new(CacheConfig::with_capacity(1000));
            for i in 0..1000u64 {
                cache.insert(i, i * 2);
            }
            black_box(cache.len())
        })
    });
}

fn soft_get_benchmark(c: &mut Criterion) {
    let cache = SoftCache::new(CacheConfig::with_capacity(1000).with_ttl(Duration::from_secs(300)));
    for i in 0..1000u64 {
        cache.insert(i, i * 2);
    }

    c.bench_function("soft_get_1000", |b| {
        b.iter(|| {
            for i in 0..1000u64 {
                black_box(cache.get(&i));
            }
        })
    });
}

fn soft_eviction_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("soft_eviction");

    for capacity in [16usize, 64, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut rng = StdRng::seed_from_u64(42);
                let cache = SoftCache::new(CacheConfig::with_capacity(capacity));
                b.iter(|| {
                    let key: u64 = rng.gen_range(0..(capacity as u64 * 4));
                    if cache.get(&key).is_none() {
                        cache.insert(key, key);
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    soft_insert_benchmark,
    soft_get_benchmark,
    soft_eviction_benchmark,
);
criterion_main!(benches);
