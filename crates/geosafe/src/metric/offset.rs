//! Planar offset (buffer) operator.
//!
//! Model
//! - The buffer of a geometry by `d > 0` is the non-zero union of its
//!   polygonal interiors, one rectangle per boundary or line segment, a join
//!   piece at every interior vertex and a cap at every open line end.
//! - `d = 0` re-nodes polygonal content; `d < 0` subtracts the boundary
//!   strokes from the polygonal content. Non-polygonal content has no
//!   interior and vanishes for `d <= 0`.
//! - Arcs are approximated with `4 * quadrant_segments` vertices per circle.

use std::f64::consts::PI;

use geo::{Coord, Geometry, LineString};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geometry::{self, Components};
use crate::kernel::overlay::{self, ccw, Contour, SetOp};

/// End treatment of open lines and points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapStyle {
    Round,
    Flat,
    Square,
}

/// Corner treatment on the convex side of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStyle {
    Round,
    Mitre,
    Bevel,
}

/// Buffer parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferStyle {
    /// Segments per quarter circle.
    pub quadrant_segments: u32,
    pub cap: CapStyle,
    pub join: JoinStyle,
    /// Mitre length over distance above which a mitre is bevelled.
    pub mitre_limit: f64,
}

impl Default for BufferStyle {
    fn default() -> Self {
        Self {
            quadrant_segments: 4,
            cap: CapStyle::Round,
            join: JoinStyle::Round,
            mitre_limit: 5.0,
        }
    }
}

impl BufferStyle {
    #[inline]
    pub fn with_cap(mut self, cap: CapStyle) -> Self {
        self.cap = cap;
        self
    }

    #[inline]
    pub fn with_join(mut self, join: JoinStyle) -> Self {
        self.join = join;
        self
    }

    #[inline]
    fn circle_vertices(&self) -> usize {
        4 * self.quadrant_segments.max(1) as usize
    }
}

type V = Vector2<f64>;

#[inline]
fn v(c: Coord<f64>) -> V {
    V::new(c.x, c.y)
}

#[inline]
fn arr(p: V) -> [f64; 2] {
    [p.x, p.y]
}

/// Left normal of a unit direction.
#[inline]
fn left(u: V) -> V {
    V::new(-u.y, u.x)
}

#[inline]
fn cross(a: V, b: V) -> f64 {
    a.x * b.y - a.y * b.x
}

fn disk(c: V, r: f64, n: usize) -> Contour {
    (0..n)
        .map(|k| {
            let th = 2.0 * PI * (k as f64) / (n as f64);
            [c.x + r * th.cos(), c.y + r * th.sin()]
        })
        .collect()
}

fn dedup_path(coords: &[Coord<f64>]) -> Vec<V> {
    let mut out: Vec<V> = Vec::with_capacity(coords.len());
    for c in coords {
        let p = v(*c);
        if out.last().map_or(true, |q| (p - q).norm() > 0.0) {
            out.push(p);
        }
    }
    out
}

struct Stroker<'a> {
    r: f64,
    style: &'a BufferStyle,
    out: Vec<Contour>,
}

impl<'a> Stroker<'a> {
    fn new(r: f64, style: &'a BufferStyle) -> Self {
        Self {
            r,
            style,
            out: Vec::new(),
        }
    }

    fn segment(&mut self, p: V, q: V) {
        let d = q - p;
        let len = d.norm();
        if len <= 0.0 {
            return;
        }
        let n = left(d / len) * self.r;
        self.out.push(ccw(vec![arr(p - n), arr(q - n), arr(q + n), arr(p + n)]));
    }

    /// Fill the gap on the outer side of the turn `u1 -> u2` at `p`.
    fn join(&mut self, p: V, u1: V, u2: V) {
        let turn = cross(u1, u2);
        if turn.abs() < 1e-12 && u1.dot(&u2) > 0.0 {
            return;
        }
        if self.style.join == JoinStyle::Round {
            self.out.push(disk(p, self.r, self.style.circle_vertices()));
            return;
        }
        // The gap opens on the right of a left turn and vice versa.
        let side = if turn > 0.0 { -1.0 } else { 1.0 };
        let n1 = left(u1) * side;
        let n2 = left(u2) * side;
        let a = p + n1 * self.r;
        let b = p + n2 * self.r;
        let denom = 1.0 + n1.dot(&n2);
        if denom < 1e-9 {
            return;
        }
        let ratio = (2.0 / denom).sqrt();
        if self.style.join == JoinStyle::Mitre && ratio <= self.style.mitre_limit {
            let m = p + (n1 + n2) * (self.r / denom);
            self.out.push(ccw(vec![arr(p), arr(a), arr(m), arr(b)]));
        } else {
            self.out.push(ccw(vec![arr(p), arr(a), arr(b)]));
        }
    }

    /// End of an open path at `p`, `u` pointing away from the path.
    fn cap(&mut self, p: V, u: V) {
        match self.style.cap {
            CapStyle::Round => self.out.push(disk(p, self.r, self.style.circle_vertices())),
            CapStyle::Square => {
                let n = left(u) * self.r;
                let e = u * self.r;
                self.out.push(ccw(vec![arr(p - n), arr(p - n + e), arr(p + n + e), arr(p + n)]));
            }
            CapStyle::Flat => {}
        }
    }

    fn point(&mut self, p: V) {
        match self.style.cap {
            CapStyle::Round => self.out.push(disk(p, self.r, self.style.circle_vertices())),
            CapStyle::Square => {
                let r = self.r;
                self.out.push(vec![
                    [p.x - r, p.y - r],
                    [p.x + r, p.y - r],
                    [p.x + r, p.y + r],
                    [p.x - r, p.y + r],
                ]);
            }
            CapStyle::Flat => {}
        }
    }

    fn open_path(&mut self, line: &LineString<f64>) {
        let pts = dedup_path(&line.0);
        match pts.len() {
            0 => {}
            1 => self.point(pts[0]),
            n => {
                for w in pts.windows(2) {
                    self.segment(w[0], w[1]);
                }
                for k in 1..n - 1 {
                    let u1 = (pts[k] - pts[k - 1]).normalize();
                    let u2 = (pts[k + 1] - pts[k]).normalize();
                    self.join(pts[k], u1, u2);
                }
                self.cap(pts[0], (pts[0] - pts[1]).normalize());
                self.cap(pts[n - 1], (pts[n - 1] - pts[n - 2]).normalize());
            }
        }
    }

    fn ring(&mut self, ring: &LineString<f64>) {
        let mut pts = dedup_path(&ring.0);
        if pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() == 0.0 {
            pts.pop();
        }
        let n = pts.len();
        if n < 2 {
            return;
        }
        for k in 0..n {
            self.segment(pts[k], pts[(k + 1) % n]);
        }
        for k in 0..n {
            let prev = pts[(k + n - 1) % n];
            let next = pts[(k + 1) % n];
            let u1 = (pts[k] - prev).normalize();
            let u2 = (next - pts[k]).normalize();
            self.join(pts[k], u1, u2);
        }
    }
}

fn polygon_strokes(comps: &Components, r: f64, style: &BufferStyle) -> Vec<Contour> {
    let mut s = Stroker::new(r, style);
    for p in &comps.polygons.0 {
        s.ring(p.exterior());
        for hole in p.interiors() {
            s.ring(hole);
        }
    }
    s.out
}

/// Planar buffer of `g` by `d` (same units as the coordinates).
pub fn buffer_planar(g: &Geometry<f64>, d: f64, style: &BufferStyle) -> Result<Geometry<f64>> {
    if !d.is_finite() {
        return Err(GeoError::argument(format!("buffer distance {d} is not finite")));
    }
    if geometry::is_empty(g) {
        return Ok(geometry::empty());
    }
    let comps = Components::of(g);
    let result = if d == 0.0 {
        overlay::self_union(&comps.polygons)?
    } else if d < 0.0 {
        if comps.polygons.0.is_empty() {
            return Ok(geometry::empty());
        }
        let filled = overlay::self_union(&comps.polygons)?;
        let band = overlay::union_contours(polygon_strokes(&comps, -d, style))?;
        overlay::polygon_overlay(&filled, &band, SetOp::Difference)?
    } else {
        let mut pieces = overlay::to_contours(&comps.polygons);
        pieces.extend(polygon_strokes(&comps, d, style));
        let mut s = Stroker::new(d, style);
        for line in &comps.lines.0 {
            s.open_path(line);
        }
        for p in &comps.points.0 {
            s.point(v(p.0));
        }
        pieces.extend(s.out);
        overlay::union_contours(pieces)?
    };
    if result.0.is_empty() {
        Ok(geometry::empty())
    } else {
        Ok(geometry::from_multi_polygon(result))
    }
}
