//! # Pool Performance Benchmark
//!
//! REQUIREMENTS:
//! - Warm pool: get/release churn with zero construction
//! - Cold pool: linear growth cost under burst
//!
//! Run with: `cargo bench --package starfall_core --bench pool_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use starfall_core::{ObjectPool, PoolRegistry};

/// Stand-in for a pooled projectile.
#[derive(Clone, Default)]
struct Dummy {
    position: [f32; 3],
    velocity: [f32; 3],
    damage: f32,
}

fn bench_warm_churn(c: &mut Criterion) {
    let mut pool = ObjectPool::new(Dummy::default, |d| *d = Dummy::default(), 1024, 64);
    let mut held = Vec::with_capacity(512);

    c.bench_function("pool_warm_get_release_512", |b| {
        b.iter(|| {
            for _ in 0..512 {
                held.push(pool.get());
            }
            for handle in held.drain(..) {
                black_box(pool.release(handle));
            }
        });
    });
}

fn bench_burst_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_burst_growth");

    for expand in [8usize, 32, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(expand), &expand, |b, &expand| {
            b.iter(|| {
                let mut pool = ObjectPool::new(Dummy::default, |d| *d = Dummy::default(), 0, expand);
                for _ in 0..1000 {
                    let handle = pool.get();
                    if let Some(d) = pool.get_mut(handle) {
                        d.damage = 1.0;
                        d.velocity[0] = 2.0;
                        d.position[2] = 3.0;
                    }
                }
                black_box(pool.total_count())
            });
        });
    }

    group.finish();
}

fn bench_registry_round_trip(c: &mut Criterion) {
    let mut registry = PoolRegistry::new();
    registry.register("dummy", Dummy::default, None, 256, 512);

    c.bench_function("registry_get_release", |b| {
        b.iter(|| {
            if let Ok(obj) = registry.get::<Dummy>("dummy") {
                let _ = registry.release("dummy", black_box(obj));
            }
        });
    });
}

criterion_group!(benches, bench_warm_churn, bench_burst_growth, bench_registry_round_trip);
criterion_main!(benches);
