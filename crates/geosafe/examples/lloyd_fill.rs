//! Fill a geographic box with Lloyd points and report spacing statistics.
//!
//! Usage:
//!   cargo run -p geosafe --example lloyd_fill -- [meters] [spacing] [seed]
//!
//! Defaults: a 50 m box near (30.3, 59.9), 5 m spacing, seed 2024.

use geo::coord;
use geosafe::api::{generate_lloyd_points_geographic, geodesic_distance, make_aabb, SeedToken};
use geo::Geometry;

fn arg(i: usize, default: f64) -> f64 {
    std::env::args()
        .nth(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() {
    let side = arg(1, 50.0);
    let spacing = arg(2, 5.0);
    let seed = arg(3, 2024.0) as u64;
    let area = Geometry::Polygon(make_aabb(coord! {x: 30.3, y: 59.9}, side, side).unwrap());
    let mut rng = SeedToken::new(seed, 0).to_rng();
    let pts = generate_lloyd_points_geographic(&area, spacing, &mut rng).unwrap();
    let nearest: Vec<f64> = pts
        .iter()
        .enumerate()
        .map(|(i, p)| {
            pts.iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, q)| geodesic_distance(*p, *q))
                .fold(f64::INFINITY, f64::min)
        })
        .collect();
    let mean = nearest.iter().sum::<f64>() / nearest.len().max(1) as f64;
    let min = nearest.iter().copied().fold(f64::INFINITY, f64::min);
    let max = nearest.iter().copied().fold(0.0, f64::max);
    println!(
        "points={} spacing={spacing} mean_nn={mean:.3} min_nn={min:.3} max_nn={max:.3}",
        pts.len()
    );
}
