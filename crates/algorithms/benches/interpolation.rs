//! Benchmarks for IDW gridding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridwell_algorithms::interpolation::{idw, IdwParams};
use gridwell_core::{GeoTransform, SamplePoint};

fn create_samples(n: usize) -> Vec<SamplePoint> {
    // Scattered wells over a 100x100 area with a tilted, rippled surface
    (0..n)
        .map(|i| {
            let x = ((i * 7919) % 10007) as f64 / 100.07;
            let y = ((i * 104729) % 10009) as f64 / 100.09;
            let z = 300.0 + 0.8 * x - 0.3 * y + (x * 0.2).sin() * 5.0;
            SamplePoint::new(x, y, z)
        })
        .collect()
}

fn grid(size: usize) -> IdwParams {
    IdwParams {
        rows: size,
        cols: size,
        transform: GeoTransform::north_up(0.0, 100.0, 100.0 / size as f64),
        ..Default::default()
    }
}

fn bench_idw_global(c: &mut Criterion) {
    let mut group = c.benchmark_group("idw_global");
    let points = create_samples(200);

    for size in [64, 128, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| idw(black_box(&points), grid(size)).unwrap())
        });
    }

    group.finish();
}

fn bench_idw_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("idw_nearest_12");

    for n in [1_000, 10_000].iter() {
        let points = create_samples(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| {
                idw(
                    black_box(&points),
                    IdwParams {
                        max_points: Some(12),
                        ..grid(256)
                    },
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_idw_global, bench_idw_nearest);
criterion_main!(benches);
