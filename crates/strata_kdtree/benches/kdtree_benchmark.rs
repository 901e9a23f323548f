//! # KD-Tree Benchmark
//!
//! Build and query costs on 10,000 random 3-D points in `[-5, 5]^3`, half of
//! them invalidated for the valid-only queries.
//!
//! Run with: `cargo bench --package strata_kdtree`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_kdtree::{
    ClipConvexPolytope, ConvexPolytope, HalfSpace, KNearestNeighborSearch, KdTree,
    NearestNeighborSearch, NearestValidNeighborSearch, RadiusNeighborSearch,
};
use strata_pool::{DoubleArrayField, Field, Localizable, MappedElement, Pool, PoolObject};

const POINT_COUNT: usize = 10_000;
const QUERY_COUNT: usize = 1_000;

struct Point;

impl Point {
    const XYZ: DoubleArrayField<3> = DoubleArrayField::at(0);
}

impl PoolObject for Point {
    const SIZE_IN_BYTES: usize = Self::XYZ.end();
}

impl Localizable<3> for Point {
    fn position(access: &MappedElement<'_>) -> [f64; 3] {
        Self::XYZ.get(access)
    }
}

fn random_point(rng: &mut ChaCha8Rng) -> [f64; 3] {
    std::array::from_fn(|_| rng.gen_range(-5.0..5.0))
}

fn setup() -> (Pool<Point>, Vec<[f64; 3]>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut pool = Pool::with_capacity(POINT_COUNT).unwrap();
    for _ in 0..POINT_COUNT {
        let slot = pool.allocate().unwrap();
        pool.set_at(slot, Point::XYZ, random_point(&mut rng)).unwrap();
    }
    let queries = (0..QUERY_COUNT).map(|_| random_point(&mut rng)).collect();
    (pool, queries)
}

fn half_invalid(pool: &Pool<Point>) -> KdTree<3> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut tree = KdTree::build_all(pool).unwrap();
    for slot in 0..POINT_COUNT {
        if rng.gen_bool(0.5) {
            tree.set_valid_data(slot, false).unwrap();
        }
    }
    tree
}

/// Benchmark: Build from scratch.
fn bench_build(c: &mut Criterion) {
    let (pool, _) = setup();
    c.bench_function("build_10k", |b| {
        b.iter(|| black_box(KdTree::<3>::build_all(&pool).unwrap().len()));
    });
}

/// Benchmark: Nearest and nearest-valid for 1000 queries.
fn bench_nearest(c: &mut Criterion) {
    let (pool, queries) = setup();
    let tree = half_invalid(&pool);

    c.bench_function("nearest_1k_queries", |b| {
        let mut search = NearestNeighborSearch::new(&tree);
        b.iter(|| {
            for q in &queries {
                black_box(search.search(q));
            }
        });
    });

    c.bench_function("nearest_valid_1k_queries", |b| {
        let mut search = NearestValidNeighborSearch::new(&tree);
        b.iter(|| {
            for q in &queries {
                black_box(search.search(q));
            }
        });
    });
}

/// Benchmark: k-nearest and radius queries.
fn bench_neighborhoods(c: &mut Criterion) {
    let (pool, queries) = setup();
    let tree = half_invalid(&pool);

    c.bench_function("k_nearest_10_1k_queries", |b| {
        let mut search = KNearestNeighborSearch::new(&tree, 10).valid_only();
        b.iter(|| {
            for q in &queries {
                black_box(search.search(q).len());
            }
        });
    });

    c.bench_function("radius_0_5_1k_queries", |b| {
        let mut search = RadiusNeighborSearch::new(&tree).valid_only();
        b.iter(|| {
            for q in &queries {
                black_box(search.search(q, 0.5, false).len());
            }
        });
    });
}

/// Benchmark: Clip against a box and iterate the valid inside values.
fn bench_clip(c: &mut Criterion) {
    let (pool, _) = setup();
    let tree = half_invalid(&pool);
    let polytope = ConvexPolytope::new(vec![
        HalfSpace::new([1.0, 0.0, 0.0], -1.0),
        HalfSpace::new([-1.0, 0.0, 0.0], -1.0),
        HalfSpace::new([0.0, 1.0, 0.0], -1.0),
        HalfSpace::new([0.0, -1.0, 0.0], -1.0),
        HalfSpace::new([0.0, 0.0, 1.0], -1.0),
        HalfSpace::new([0.0, 0.0, -1.0], -1.0),
    ]);

    c.bench_function("clip_box_and_iterate", |b| {
        let mut clip = ClipConvexPolytope::new(&tree);
        b.iter(|| {
            clip.clip(&polytope);
            black_box(clip.inside_values().into_iter().count())
        });
    });
}

criterion_group!(benches, bench_build, bench_nearest, bench_neighborhoods, bench_clip);
criterion_main!(benches);
