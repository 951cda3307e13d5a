//! Planar nearest points, minimum width and vertex angles.
//!
//! All functions here work on coordinates already in a metric frame.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Closest, ClosestPoint, ConvexHull, Coord, CoordsIter, EuclideanDistance, Geometry, Intersects,
    Line, Point,
};

use crate::geometry;

fn segments(g: &Geometry<f64>) -> Vec<Line<f64>> {
    let mut out = Vec::new();
    for part in geometry::parts(g) {
        match part {
            Geometry::LineString(ls) => out.extend(ls.lines()),
            Geometry::Polygon(p) => {
                out.extend(p.exterior().lines());
                for hole in p.interiors() {
                    out.extend(hole.lines());
                }
            }
            _ => {}
        }
    }
    out
}

fn closest_on(g: &Geometry<f64>, p: Point<f64>) -> Option<Point<f64>> {
    match g.closest_point(&p) {
        Closest::Intersection(q) | Closest::SinglePoint(q) => Some(q),
        Closest::Indeterminate => None,
    }
}

type Pair = (f64, Coord<f64>, Coord<f64>);

#[inline]
fn offer(best: &mut Option<Pair>, d: f64, pa: Coord<f64>, pb: Coord<f64>) {
    if best.map_or(true, |(bd, _, _)| d < bd) {
        *best = Some((d, pa, pb));
    }
}

/// Closest pair `(on a, on b)`, or `None` when either side has no coordinates.
pub fn nearest_points_planar(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let mut best: Option<Pair> = None;
    for c in b.coords_iter() {
        let pb = Point::from(c);
        if let Some(pa) = closest_on(a, pb) {
            offer(&mut best, pa.euclidean_distance(&pb), pa.0, c);
        }
    }
    for c in a.coords_iter() {
        let pa = Point::from(c);
        if let Some(pb) = closest_on(b, pa) {
            offer(&mut best, pa.euclidean_distance(&pb), c, pb.0);
        }
    }
    if best.map_or(false, |(d, _, _)| d > 0.0) && a.intersects(b) {
        // Crossing edges meet away from every vertex.
        let sb = segments(b);
        'outer: for la in segments(a) {
            for lb in &sb {
                if let Some(LineIntersection::SinglePoint { intersection, .. }) =
                    line_intersection(la, *lb)
                {
                    offer(&mut best, 0.0, intersection, intersection);
                    break 'outer;
                }
            }
        }
    }
    best.map(|(_, pa, pb)| (pa, pb))
}

/// Smallest caliper width of the convex hull.
pub fn min_width_planar(g: &Geometry<f64>) -> f64 {
    let hull = g.convex_hull();
    let mut pts: Vec<Coord<f64>> = hull.exterior().0.clone();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return 0.0;
    }
    let n = pts.len();
    let mut width = f64::INFINITY;
    for k in 0..n {
        let p = pts[k];
        let q = pts[(k + 1) % n];
        let dx = q.x - p.x;
        let dy = q.y - p.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= 0.0 {
            continue;
        }
        let far = pts
            .iter()
            .map(|c| ((c.x - p.x) * dy - (c.y - p.y) * dx).abs() / len)
            .fold(0.0, f64::max);
        width = width.min(far);
    }
    if width.is_finite() {
        width
    } else {
        0.0
    }
}

/// Unoriented angle at `middle` between the rays to `a` and `b`, in [0, π].
pub fn angle_between_planar(a: Coord<f64>, middle: Coord<f64>, b: Coord<f64>) -> f64 {
    let a1 = (a.y - middle.y).atan2(a.x - middle.x);
    let a2 = (b.y - middle.y).atan2(b.x - middle.x);
    let mut d = (a2 - a1).abs();
    if d > std::f64::consts::PI {
        d = 2.0 * std::f64::consts::PI - d;
    }
    d
}
