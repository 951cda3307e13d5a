//! Voronoi cells as ordered half-plane intersections.
//!
//! - `HalfPlane`: closed half-plane `n·x <= c`.
//! - `Cell`: angle-sorted set of half-planes with unit normals and coalesced
//!   parallels; its intersection is computed with a deque sweep.
//! - A site's cell is the bounding rectangle cut by the perpendicular
//!   bisector towards every neighbour: `(q - p)·x <= (|q|² - |p|²) / 2`.

use std::collections::VecDeque;

use geo::{Coord, LineString, Polygon, Rect};
use nalgebra::Vector2;

const PARALLEL_EPS: f64 = 1e-9;
const DET_EPS: f64 = 1e-12;

/// Closed half-plane `n · x <= c`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HalfPlane {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl HalfPlane {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }

    #[inline]
    pub fn satisfies_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        self.n.dot(&p) <= self.c + eps
    }

    /// Points closer to `p` than to `q`.
    pub fn bisector(p: Vector2<f64>, q: Vector2<f64>) -> Self {
        Self::new(q - p, 0.5 * (q.norm_squared() - p.norm_squared()))
    }
}

#[inline]
fn angle_of(n: Vector2<f64>) -> f64 {
    n.y.atan2(n.x)
}

#[inline]
fn canonicalize_unit(n: Vector2<f64>, c: f64) -> Option<(Vector2<f64>, f64)> {
    let norm = n.norm();
    if !norm.is_finite() || norm <= 0.0 {
        return None;
    }
    Some((n / norm, c / norm))
}

/// Intersection result: empty, unbounded, or CCW vertices.
#[derive(Clone, Debug)]
pub(crate) enum CellShape {
    Empty,
    Unbounded,
    Bounded(Vec<Vector2<f64>>),
}

impl CellShape {
    #[inline]
    pub fn vertices(self) -> Option<Vec<Vector2<f64>>> {
        match self {
            CellShape::Bounded(v) => Some(v),
            _ => None,
        }
    }
}

/// Angle-ordered H-representation.
///
/// Invariants: unit normals, sorted by `atan2(n.y, n.x)`, parallels
/// coalesced to the most restrictive offset.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cell {
    pub hs: Vec<HalfPlane>,
}

impl Cell {
    /// Axis-aligned rectangle.
    pub fn from_rect(r: &Rect<f64>) -> Self {
        let mut cell = Cell::default();
        cell.insert(HalfPlane::new(Vector2::new(1.0, 0.0), r.max().x));
        cell.insert(HalfPlane::new(Vector2::new(0.0, 1.0), r.max().y));
        cell.insert(HalfPlane::new(Vector2::new(-1.0, 0.0), -r.min().x));
        cell.insert(HalfPlane::new(Vector2::new(0.0, -1.0), -r.min().y));
        cell
    }

    /// Insert keeping the angle order; a parallel keeps the smaller offset.
    pub fn insert(&mut self, h: HalfPlane) {
        let Some((n, c)) = canonicalize_unit(h.n, h.c) else {
            return;
        };
        let key = angle_of(n);
        let lo = self.hs.partition_point(|e| angle_of(e.n) <= key);
        for k in [lo.checked_sub(1), Some(lo)].into_iter().flatten() {
            if let Some(e) = self.hs.get_mut(k) {
                if (e.n - n).norm() < PARALLEL_EPS {
                    e.c = e.c.min(c);
                    return;
                }
            }
        }
        self.hs.insert(lo, HalfPlane::new(n, c));
    }

    #[inline]
    pub fn contains_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        self.hs.iter().all(|h| h.satisfies_eps(p, eps))
    }

    pub fn intersection(&self) -> CellShape {
        intersect_ordered(&self.hs, 0.0)
    }
}

fn line_intersection(h1: HalfPlane, h2: HalfPlane) -> Option<Vector2<f64>> {
    let a = nalgebra::matrix![h1.n.x, h1.n.y; h2.n.x, h2.n.y];
    if a.determinant().abs() < DET_EPS {
        return None;
    }
    let inv = a.try_inverse()?;
    Some(inv * Vector2::new(h1.c, h2.c))
}

fn intersect_ordered(hs: &[HalfPlane], eps: f64) -> CellShape {
    if hs.is_empty() {
        return CellShape::Unbounded;
    }
    // Opposite parallels with disjoint slabs.
    for (i, a) in hs.iter().enumerate() {
        for b in &hs[i + 1..] {
            if (a.n + b.n).norm() < PARALLEL_EPS && -b.c > a.c + eps {
                return CellShape::Empty;
            }
        }
    }
    let meet = |i: usize, j: usize| line_intersection(hs[i], hs[j]);
    let mut dq: VecDeque<usize> = VecDeque::new();
    for (i, h) in hs.iter().enumerate() {
        while dq.len() >= 2 {
            match meet(dq[dq.len() - 2], dq[dq.len() - 1]) {
                Some(p) if h.satisfies_eps(p, eps) => break,
                _ => {
                    dq.pop_back();
                }
            }
        }
        while dq.len() >= 2 {
            match meet(dq[0], dq[1]) {
                Some(p) if h.satisfies_eps(p, eps) => break,
                _ => {
                    dq.pop_front();
                }
            }
        }
        dq.push_back(i);
    }
    while dq.len() >= 3 {
        match meet(dq[dq.len() - 2], dq[dq.len() - 1]) {
            Some(p) if hs[dq[0]].satisfies_eps(p, eps) => break,
            _ => {
                dq.pop_back();
            }
        }
    }
    while dq.len() >= 3 {
        match meet(dq[0], dq[1]) {
            Some(p) if hs[dq[dq.len() - 1]].satisfies_eps(p, eps) => break,
            _ => {
                dq.pop_front();
            }
        }
    }
    if dq.is_empty() {
        return CellShape::Empty;
    }
    if dq.len() < 3 {
        return CellShape::Unbounded;
    }
    let m = dq.len();
    let mut verts = Vec::with_capacity(m);
    for k in 0..m {
        match meet(dq[k], dq[(k + 1) % m]) {
            Some(p) => verts.push(p),
            None => return CellShape::Unbounded,
        }
    }
    CellShape::Bounded(verts)
}

#[inline]
fn vec2(c: Coord<f64>) -> Vector2<f64> {
    Vector2::new(c.x, c.y)
}

/// Voronoi cell of `site` within `bounds`, given its Delaunay neighbours.
pub(crate) fn voronoi_cell(
    site: Coord<f64>,
    neighbours: &[Coord<f64>],
    bounds: &Rect<f64>,
) -> Option<Polygon<f64>> {
    let p = vec2(site);
    let mut cell = Cell::from_rect(bounds);
    for q in neighbours {
        let q = vec2(*q);
        if (q - p).norm() > 0.0 {
            cell.insert(HalfPlane::bisector(p, q));
        }
    }
    let verts = cell.intersection().vertices()?;
    let ring: Vec<Coord<f64>> = verts.iter().map(|v| Coord { x: v.x, y: v.y }).collect();
    Some(Polygon::new(LineString::new(crate::geometry::close_ring(&ring)), vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Area, Centroid};

    fn unit_box() -> Rect<f64> {
        Rect::new(coord! {x: 0.0, y: 0.0}, coord! {x: 1.0, y: 1.0})
    }

    #[test]
    fn rectangle_cell_has_four_vertices() {
        let verts = Cell::from_rect(&unit_box()).intersection().vertices().unwrap();
        assert_eq!(verts.len(), 4);
        for v in &verts {
            assert!(v.x.abs() < 1e-12 || (v.x - 1.0).abs() < 1e-12);
            assert!(v.y.abs() < 1e-12 || (v.y - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn parallel_cuts_coalesce() {
        let mut cell = Cell::from_rect(&unit_box());
        cell.insert(HalfPlane::new(Vector2::new(2.0, 0.0), 1.0));
        cell.insert(HalfPlane::new(Vector2::new(1.0, 0.0), 0.9));
        assert_eq!(cell.hs.len(), 4);
        let verts = cell.intersection().vertices().unwrap();
        let max_x = verts.iter().map(|v| v.x).fold(f64::MIN, f64::max);
        assert!((max_x - 0.5).abs() < 1e-12);
        assert!(cell.contains_eps(Vector2::new(0.25, 0.5), 0.0));
        assert!(!cell.contains_eps(Vector2::new(0.75, 0.5), 0.0));
    }

    #[test]
    fn contradictory_slab_is_empty() {
        let mut cell = Cell::default();
        cell.insert(HalfPlane::new(Vector2::new(1.0, 0.0), 0.0));
        cell.insert(HalfPlane::new(Vector2::new(-1.0, 0.0), -1.0));
        assert!(matches!(cell.intersection(), CellShape::Empty));
    }

    #[test]
    fn open_wedge_is_unbounded() {
        let mut cell = Cell::default();
        cell.insert(HalfPlane::new(Vector2::new(1.0, 0.0), 1.0));
        cell.insert(HalfPlane::new(Vector2::new(0.0, 1.0), 1.0));
        assert!(matches!(cell.intersection(), CellShape::Unbounded));
    }

    #[test]
    fn two_sites_split_the_box() {
        let a = coord! {x: 0.25, y: 0.5};
        let b = coord! {x: 0.75, y: 0.5};
        let ca = voronoi_cell(a, &[b], &unit_box()).unwrap();
        let cb = voronoi_cell(b, &[a], &unit_box()).unwrap();
        assert!((ca.unsigned_area() - 0.5).abs() < 1e-12);
        assert!((cb.unsigned_area() - 0.5).abs() < 1e-12);
        let centroid = ca.centroid().unwrap();
        assert!((centroid.x() - 0.25).abs() < 1e-12 && (centroid.y() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn lone_site_owns_the_box() {
        let cell = voronoi_cell(coord! {x: 0.1, y: 0.9}, &[], &unit_box()).unwrap();
        assert!((cell.unsigned_area() - 1.0).abs() < 1e-12);
    }
}
