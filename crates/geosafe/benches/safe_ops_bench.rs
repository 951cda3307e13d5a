//! Criterion microbenches for prepared one-against-many queries.
//!
//! - `intersects` of a prepared 100-part grid against single boxes.
//! - `difference` of the prepared grid by a box covering a quarter of it.
//! - Repair of a self-intersecting ring.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::{polygon, Geometry, MultiPolygon, Polygon};
use geosafe::safe_ops::PreparedOperand;
use geosafe::topology::fix_geometry;

fn cell(x: f64, y: f64, s: f64) -> Polygon<f64> {
    polygon![(x: x, y: y), (x: x + s, y: y), (x: x + s, y: y + s), (x: x, y: y + s)]
}

fn grid(n: usize) -> Geometry<f64> {
    let step = 0.001;
    let parts = (0..n * n)
        .map(|k| cell(30.0 + (k % n) as f64 * step, 60.0 + (k / n) as f64 * step, step * 0.8))
        .collect();
    Geometry::MultiPolygon(MultiPolygon::new(parts))
}

fn bench_prepared(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepared");
    let a = PreparedOperand::new(&grid(10));
    let queries: Vec<Geometry<f64>> = (0..16)
        .map(|k| {
            let offset = k as f64 * 0.0006;
            Geometry::Polygon(cell(30.0 + offset, 60.0 + offset, 0.0003))
        })
        .collect();
    group.bench_function(BenchmarkId::new("intersects", queries.len()), |b| {
        b.iter(|| queries.iter().filter(|p| a.intersects(black_box(p))).count())
    });
    let quarter = Geometry::Polygon(cell(29.9995, 59.9995, 0.005));
    group.bench_function("difference_quarter", |b| b.iter(|| a.difference(black_box(&quarter))));
    group.finish();
}

fn bench_repair(c: &mut Criterion) {
    let bowtie = Geometry::Polygon(polygon![
        (x: 30.0, y: 60.0), (x: 30.01, y: 60.01), (x: 30.01, y: 60.0), (x: 30.0, y: 60.01),
    ]);
    c.bench_function("fix_bowtie", |b| b.iter(|| fix_geometry(black_box(&bowtie))));
}

criterion_group!(benches, bench_prepared, bench_repair);
criterion_main!(benches);
