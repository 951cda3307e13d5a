//! Structural validity checks for polygonal geometry.
//!
//! Model
//! - Segment pairs are found through an R-tree over segment envelopes, then
//!   classified with an exact segment intersection test.
//! - Ring against itself: a proper crossing or a collinear overlap is a
//!   `SelfIntersection`; a touch at a single point is a
//!   `RingSelfIntersection`.
//! - Hole against shell: any crossing or a hole vertex outside the shell is
//!   `HoleOutsideShell`. Hole against hole: a crossing is a
//!   `SelfIntersection`, a hole inside another hole is `Other`.
//! - Multipolygon parts with overlapping interiors are a `SelfIntersection`.

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::dimensions::Dimensions;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Coord, Geometry, Line, LineString, MultiPolygon, Polygon, Relate};
use rstar::{RTree, RTreeObject, AABB};

use super::TopologyCfg;
use crate::error::{ValidityError, ValidityErrorKind};
use crate::geometry;

type Check = Result<(), ValidityError>;

fn invalid(kind: ValidityErrorKind, at: Option<Coord<f64>>, msg: impl Into<String>) -> Check {
    Err(ValidityError::new(kind, at, msg))
}

/// Segment with its position in the owning ring.
#[derive(Clone, Debug)]
struct IndexedSegment {
    idx: usize,
    line: Line<f64>,
    bounds: AABB<[f64; 2]>,
}

impl IndexedSegment {
    fn new(idx: usize, line: Line<f64>, eps: f64) -> Self {
        let bounds = AABB::from_corners(
            [line.start.x.min(line.end.x) - eps, line.start.y.min(line.end.y) - eps],
            [line.start.x.max(line.end.x) + eps, line.start.y.max(line.end.y) + eps],
        );
        Self {
            idx,
            line,
            bounds,
        }
    }
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

fn ring_segments(ring: &LineString<f64>) -> Vec<Line<f64>> {
    ring.lines().filter(|l| l.start != l.end).collect()
}

fn check_coords(g: &Geometry<f64>) -> Check {
    if geometry::is_finite(g) {
        Ok(())
    } else {
        invalid(ValidityErrorKind::Other, None, "non-finite coordinate")
    }
}

fn check_ring_size(ring: &LineString<f64>) -> Check {
    let mut distinct: Vec<Coord<f64>> = ring.0.clone();
    distinct.dedup();
    if distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }
    if distinct.len() < 3 {
        return invalid(
            ValidityErrorKind::Other,
            ring.0.first().copied(),
            format!("ring has {} distinct points, at least 3 required", distinct.len()),
        );
    }
    Ok(())
}

/// Intersections of one ring with itself.
fn check_ring_simple(ring: &LineString<f64>, cfg: &TopologyCfg) -> Check {
    let segs = ring_segments(ring);
    let n = segs.len();
    let tree = RTree::bulk_load(
        segs.iter()
            .enumerate()
            .map(|(i, l)| IndexedSegment::new(i, *l, cfg.eps))
            .collect(),
    );
    for seg in tree.iter() {
        for other in tree.locate_in_envelope_intersecting(&seg.bounds) {
            let (i, j) = (seg.idx, other.idx);
            if j <= i {
                continue;
            }
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(seg.line, other.line) {
                None => {}
                Some(LineIntersection::Collinear { intersection }) => {
                    if intersection.start != intersection.end {
                        return invalid(
                            ValidityErrorKind::SelfIntersection,
                            Some(intersection.start),
                            "ring overlaps itself",
                        );
                    }
                    if !adjacent {
                        return invalid(
                            ValidityErrorKind::RingSelfIntersection,
                            Some(intersection.start),
                            "ring touches itself",
                        );
                    }
                }
                Some(LineIntersection::SinglePoint {
                    intersection,
                    is_proper,
                }) => {
                    if adjacent {
                        continue;
                    }
                    let kind = if is_proper {
                        ValidityErrorKind::SelfIntersection
                    } else {
                        ValidityErrorKind::RingSelfIntersection
                    };
                    return invalid(kind, Some(intersection), "ring intersects itself");
                }
            }
        }
    }
    Ok(())
}

/// Where the two rings cross or overlap along a segment; touching at
/// isolated points does not count.
fn rings_cross(a: &LineString<f64>, b: &LineString<f64>, eps: f64) -> Option<Coord<f64>> {
    let tree = RTree::bulk_load(
        ring_segments(b)
            .into_iter()
            .enumerate()
            .map(|(i, l)| IndexedSegment::new(i, l, eps))
            .collect(),
    );
    for la in ring_segments(a) {
        let query = IndexedSegment::new(0, la, eps);
        for other in tree.locate_in_envelope_intersecting(&query.bounds) {
            match line_intersection(la, other.line) {
                Some(LineIntersection::SinglePoint {
                    intersection,
                    is_proper: true,
                }) => return Some(intersection),
                Some(LineIntersection::Collinear { intersection })
                    if intersection.start != intersection.end =>
                {
                    return Some(intersection.start)
                }
                _ => {}
            }
        }
    }
    None
}

fn first_vertex_where(
    ring: &LineString<f64>,
    area: &Polygon<f64>,
    pos: CoordPos,
) -> Option<Coord<f64>> {
    ring.0
        .iter()
        .copied()
        .find(|c| area.coordinate_position(c) == pos)
}

fn check_polygon(p: &Polygon<f64>, cfg: &TopologyCfg) -> Check {
    check_ring_size(p.exterior())?;
    check_ring_simple(p.exterior(), cfg)?;
    for hole in p.interiors() {
        check_ring_size(hole)?;
        check_ring_simple(hole, cfg)?;
    }
    let shell = Polygon::new(p.exterior().clone(), vec![]);
    for hole in p.interiors() {
        if let Some(at) = rings_cross(hole, p.exterior(), cfg.eps) {
            return invalid(ValidityErrorKind::HoleOutsideShell, Some(at), "hole crosses the shell");
        }
        if let Some(at) = first_vertex_where(hole, &shell, CoordPos::Outside) {
            return invalid(
                ValidityErrorKind::HoleOutsideShell,
                Some(at),
                "hole lies outside the shell",
            );
        }
    }
    let holes = p.interiors();
    for (i, a) in holes.iter().enumerate() {
        for b in &holes[i + 1..] {
            if let Some(at) = rings_cross(a, b, cfg.eps) {
                return invalid(ValidityErrorKind::SelfIntersection, Some(at), "holes cross");
            }
            let pa = Polygon::new(a.clone(), vec![]);
            let pb = Polygon::new(b.clone(), vec![]);
            let nested = first_vertex_where(b, &pa, CoordPos::Inside)
                .or_else(|| first_vertex_where(a, &pb, CoordPos::Inside));
            if let Some(at) = nested {
                return invalid(ValidityErrorKind::Other, Some(at), "nested holes");
            }
        }
    }
    Ok(())
}

fn check_multi_polygon(mp: &MultiPolygon<f64>, cfg: &TopologyCfg) -> Check {
    for p in &mp.0 {
        check_polygon(p, cfg)?;
    }
    let boxes: Vec<_> = mp.0.iter().map(|p| p.bounding_rect()).collect();
    for i in 0..mp.0.len() {
        for j in i + 1..mp.0.len() {
            let (Some(bi), Some(bj)) = (boxes[i], boxes[j]) else {
                continue;
            };
            let disjoint = bi.max().x < bj.min().x
                || bj.max().x < bi.min().x
                || bi.max().y < bj.min().y
                || bj.max().y < bi.min().y;
            if disjoint {
                continue;
            }
            let im = mp.0[i].relate(&mp.0[j]);
            if im.get(CoordPos::Inside, CoordPos::Inside) != Dimensions::Empty {
                return invalid(
                    ValidityErrorKind::SelfIntersection,
                    mp.0[j].exterior().0.first().copied(),
                    "multipolygon parts overlap",
                );
            }
        }
    }
    Ok(())
}

/// First defect found in `g`, if any.
pub(crate) fn check(g: &Geometry<f64>, cfg: &TopologyCfg) -> Check {
    check_coords(g)?;
    match g {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Ok(()),
        Geometry::Line(_) => Ok(()),
        Geometry::LineString(ls) => check_line(ls),
        Geometry::MultiLineString(mls) => mls.0.iter().try_for_each(check_line),
        Geometry::Polygon(p) => check_polygon(p, cfg),
        Geometry::MultiPolygon(mp) => check_multi_polygon(mp, cfg),
        Geometry::Rect(_) | Geometry::Triangle(_) => Ok(()),
        Geometry::GeometryCollection(gc) => gc.0.iter().try_for_each(|part| check(part, cfg)),
    }
}

fn check_line(ls: &LineString<f64>) -> Check {
    if ls.0.len() == 1 {
        return invalid(ValidityErrorKind::Other, ls.0.first().copied(), "line with a single point");
    }
    Ok(())
}
