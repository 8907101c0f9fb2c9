//! Spatial index benchmarks.
//!
//! Measures:
//! - Rebuild time for a grid of regions
//! - Point query latency (the per-block-interaction hot path)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use regionguard_geometry::BoundingBox;
use regionguard_index::SpatialIndex;
use regionguard_types::{BlockVector, RegionId};

/// Regions laid out on a square grid with some overlap between neighbours.
fn generate_regions(count: usize) -> Vec<(RegionId, BoundingBox)> {
    let side = (count as f64).sqrt().ceil() as i32;
    (0..count as i32)
        .map(|i| {
            let (gx, gz) = (i % side, i / side);
            let min = BlockVector::new(gx * 48, 0, gz * 48);
            let max = BlockVector::new(gx * 48 + 64, 256, gz * 48 + 64);
            let id = RegionId::new(format!("plot-{i}")).expect("valid id");
            (id, BoundingBox::new(min, max).expect("non-degenerate"))
        })
        .collect()
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    for count in [1_000usize, 10_000, 50_000] {
        let regions = generate_regions(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &regions, |b, regions| {
            b.iter(|| {
                let mut index = SpatialIndex::default();
                index.rebuild(regions.iter().cloned());
                black_box(index.len())
            });
        });
    }
    group.finish();
}

fn bench_point_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_point");
    for count in [1_000usize, 10_000, 50_000] {
        let mut index = SpatialIndex::default();
        index.rebuild(generate_regions(count));
        let side = (count as f64).sqrt().ceil() as i32 * 48;
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            let mut n: i32 = 0;
            b.iter(|| {
                n = n.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let p = BlockVector::new(n.rem_euclid(side), 64, (n >> 8).rem_euclid(side));
                black_box(index.query_point(p).count())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_point_query);
criterion_main!(benches);
