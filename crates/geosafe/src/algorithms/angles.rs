//! Cut sharp corners off a polygon outline.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::{Coord, Geometry};
use tracing::debug;

use crate::error::{GeoError, Result};
use crate::geometry;
use crate::metric::angle_between_planar;
use crate::projection::{LocalProjection, PlanarFrame};

/// Corners below this angle are treated as sharp.
const SHARP_ANGLE: f64 = 0.9 * FRAC_PI_2;
/// Search steps along each corner side.
const CUT_STEPS: u32 = 5;

fn dist(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Cut every corner of `g` sharper than 81 degrees so that the outline is at
/// least `min_width` meters wide there.
///
/// Only polygons are touched; other geometries come back unchanged. The
/// result is built from the exterior ring, so holes are dropped. Corners
/// sharper than 45 degrees are cut twice as wide. A corner whose neighbours
/// are already closer than the width loses its vertex; otherwise the vertex
/// is replaced by the first pair of points, walking down both sides in five
/// equal steps of the shorter side, that lie further apart than the width.
/// Fewer than three surviving vertices give an empty geometry.
pub fn remove_narrow_angles(g: &Geometry<f64>, min_width: f64) -> Result<Geometry<f64>> {
    let Geometry::Polygon(polygon) = g else {
        return Ok(g.clone());
    };
    if !(min_width.is_finite() && min_width >= 0.0) {
        return Err(GeoError::argument(format!(
            "minimum width must be non-negative, got {min_width}"
        )));
    }
    let frame = LocalProjection::for_geometry(g)?;
    let local = frame.forward(polygon.exterior())?;
    let mut ring = local.0;
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return Ok(geometry::empty());
    }
    let cut = cut_corners(&ring, min_width);
    if cut.len() < 3 {
        debug!(vertices = ring.len(), min_width, "outline collapsed");
        return Ok(geometry::empty());
    }
    let out = frame.inverse(&geometry::make_polygon(&cut))?;
    Ok(Geometry::Polygon(out))
}

fn cut_corners(ring: &[Coord<f64>], min_width: f64) -> Vec<Coord<f64>> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n + 4);
    for i in 0..n {
        let p = ring[i];
        let prev = ring[(i + n - 1) % n];
        let next = ring[(i + 1) % n];
        let angle = angle_between_planar(prev, p, next);
        if angle >= SHARP_ANGLE {
            out.push(p);
            continue;
        }
        let width = if angle < FRAC_PI_4 {
            2.0 * min_width
        } else {
            min_width
        };
        if dist(prev, next) < width {
            continue;
        }
        let (left, right) = (prev - p, next - p);
        let (left_len, right_len) = (dist(prev, p), dist(next, p));
        let step = left_len.min(right_len) / CUT_STEPS as f64;
        let cut = (1..=CUT_STEPS)
            .map(|k| {
                let along = k as f64 * step;
                (
                    p + left * (along / left_len),
                    p + right * (along / right_len),
                )
            })
            .find(|&(a, b)| dist(a, b) > width);
        match cut {
            Some((a, b)) => {
                out.push(a);
                out.push(b);
            }
            None => out.push(p),
        }
    }
    out
}
