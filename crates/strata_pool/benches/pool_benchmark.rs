//! # Pool Benchmark
//!
//! Allocation, swap-to-compact freeing and dense scans over pooled records.
//!
//! Run with: `cargo bench --package strata_pool`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_pool::{
    ChunkedByteArray, DoubleArrayField, EntityPool, Field, MappedElementArray, Pool, PoolConfig,
    PoolObject, SingleByteArray,
};

struct Point;

impl Point {
    const XYZ: DoubleArrayField<3> = DoubleArrayField::at(0);
}

impl PoolObject for Point {
    const SIZE_IN_BYTES: usize = Self::XYZ.end();
}

fn fill<A: MappedElementArray>(count: usize) -> Pool<Point, A> {
    let mut pool = Pool::new(&PoolConfig::with_initial_capacity(16)).unwrap();
    for i in 0..count {
        let slot = pool.allocate().unwrap();
        let x = i as f64;
        pool.set_at(slot, Point::XYZ, [x, -x, 0.5 * x]).unwrap();
    }
    pool
}

/// Benchmark: Allocate with doubling growth.
fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");

    for count in [10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("single", count), &count, |b, &count| {
            b.iter(|| black_box(fill::<SingleByteArray>(count).len()));
        });
        group.bench_with_input(BenchmarkId::new("chunked", count), &count, |b, &count| {
            b.iter(|| black_box(fill::<ChunkedByteArray>(count).len()));
        });
    }

    group.finish();
}

/// Benchmark: Dense scan summing one coordinate.
fn bench_scan(c: &mut Criterion) {
    let pool = fill::<SingleByteArray>(100_000);
    c.bench_function("scan_100k", |b| {
        b.iter(|| {
            let sum: f64 = pool
                .memory()
                .elements()
                .map(|access| Point::XYZ.get_one(&access, 0))
                .sum();
            black_box(sum)
        });
    });
}

/// Benchmark: Random removal by id with relocation bookkeeping.
fn bench_entity_churn(c: &mut Criterion) {
    c.bench_function("entity_churn_10k", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let mut pool: EntityPool<Point> = EntityPool::with_capacity(1024).unwrap();
            for _ in 0..10_000 {
                pool.create().unwrap();
            }
            while !pool.is_empty() {
                let victim = pool.ids()[rng.gen_range(0..pool.len())];
                pool.remove(victim).unwrap();
            }
            black_box(pool.len())
        });
    });
}

criterion_group!(benches, bench_allocate, bench_scan, bench_entity_churn);
criterion_main!(benches);
