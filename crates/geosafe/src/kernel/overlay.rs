//! Boolean predicates and set algebra over arbitrary `Geometry` values.
//!
//! Polygonal content goes through `i_overlay`; lines are clipped against the
//! polygonal content of the other operand; points are filtered by position.
//! Line-line and point-line interactions are not resolved by the set
//! operations (they are kept or dropped with their own operand).

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::dimensions::Dimensions;
use geo::{
    BooleanOps, Geometry, HasDimensions, Intersects, LineString, MultiPoint, MultiPolygon, Polygon,
    Relate,
};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::overlay::FloatOverlay;
use i_overlay::float::single::SingleFloatOverlay;
use i_overlay::float::slice::FloatSlice;

use super::guarded;
use crate::error::{GeoError, Result};
use crate::geometry::{self, Components};

pub(crate) type Contour = Vec<[f64; 2]>;

/// Polygon set operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SetOp {
    Intersection,
    Union,
    Difference,
}

impl SetOp {
    fn rule(self) -> OverlayRule {
        match self {
            SetOp::Intersection => OverlayRule::Intersect,
            SetOp::Union => OverlayRule::Union,
            SetOp::Difference => OverlayRule::Difference,
        }
    }
}

fn signed_ring_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    let mut acc = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        acc += p[0] * q[1] - q[0] * p[1];
    }
    0.5 * acc
}

/// Ring as an open contour with the requested orientation.
fn ring_contour(ring: &LineString<f64>, ccw: bool) -> Option<Contour> {
    let mut pts: Contour = ring.0.iter().map(|c| [c.x, c.y]).collect();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return None;
    }
    let area = signed_ring_area(&pts);
    if (area > 0.0) != ccw {
        pts.reverse();
    }
    Some(pts)
}

/// Reverse the contour if it winds clockwise.
pub(crate) fn ccw(mut pts: Contour) -> Contour {
    if signed_ring_area(&pts) < 0.0 {
        pts.reverse();
    }
    pts
}

/// Exterior rings counter-clockwise, holes clockwise, so that non-zero
/// filling subtracts holes and merges overlapping parts.
pub(crate) fn polygon_contours(polygon: &Polygon<f64>, out: &mut Vec<Contour>) {
    if let Some(ext) = ring_contour(polygon.exterior(), true) {
        out.push(ext);
        out.extend(
            polygon
                .interiors()
                .iter()
                .filter_map(|hole| ring_contour(hole, false)),
        );
    }
}

pub(crate) fn to_contours(mp: &MultiPolygon<f64>) -> Vec<Contour> {
    let mut out = Vec::new();
    for p in &mp.0 {
        polygon_contours(p, &mut out);
    }
    out
}

fn contour_ring(contour: Contour) -> LineString<f64> {
    let mut ring: LineString<f64> = contour.into_iter().map(|[x, y]| (x, y)).collect();
    ring.close();
    ring
}

fn from_shapes(shapes: Vec<Vec<Contour>>) -> Result<MultiPolygon<f64>> {
    let mut polys = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let mut contours = shape.into_iter().filter(|c| c.len() >= 3);
        let Some(outer) = contours.next() else {
            continue;
        };
        let holes: Vec<LineString<f64>> = contours.map(contour_ring).collect();
        polys.push(Polygon::new(contour_ring(outer), holes));
    }
    let mp = MultiPolygon::new(polys);
    if !geometry::is_finite(&Geometry::MultiPolygon(mp.clone())) {
        return Err(GeoError::topology_operation("overlay produced non-finite coordinates"));
    }
    Ok(mp)
}

/// Fill and merge a set of contours (non-zero rule).
pub(crate) fn union_contours(contours: Vec<Contour>) -> Result<MultiPolygon<f64>> {
    if contours.is_empty() {
        return Ok(MultiPolygon::new(vec![]));
    }
    let shapes = guarded("union", || {
        FloatOverlay::with_subj(&contours).overlay(OverlayRule::Subject, FillRule::NonZero)
    })?;
    from_shapes(shapes)
}

/// Re-node a polygonal geometry: self-crossings become a valid boundary.
pub(crate) fn self_union(mp: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
    union_contours(to_contours(mp))
}

/// Cut polygons along open paths; every face of the cut is one polygon.
///
/// Paths that do not cross a polygon from boundary to boundary leave it whole.
pub(crate) fn slice_by_paths(
    mp: &MultiPolygon<f64>,
    paths: &geo::MultiLineString<f64>,
) -> Result<MultiPolygon<f64>> {
    let subj = to_contours(mp);
    if subj.is_empty() {
        return Ok(MultiPolygon::new(vec![]));
    }
    let strings: Vec<Contour> = paths
        .0
        .iter()
        .filter(|line| line.0.len() >= 2)
        .map(|line| line.0.iter().map(|c| [c.x, c.y]).collect())
        .collect();
    if strings.is_empty() {
        return union_contours(subj);
    }
    let shapes = guarded("slice", || subj.slice_by(&strings, FillRule::NonZero))?;
    from_shapes(shapes)
}

/// Polygon set algebra on multipolygons.
pub(crate) fn polygon_overlay(
    subject: &MultiPolygon<f64>,
    clip: &MultiPolygon<f64>,
    op: SetOp,
) -> Result<MultiPolygon<f64>> {
    let subj = to_contours(subject);
    let clp = to_contours(clip);
    match (subj.is_empty(), clp.is_empty(), op) {
        (true, true, _) => return Ok(MultiPolygon::new(vec![])),
        (true, _, SetOp::Intersection | SetOp::Difference) => {
            return Ok(MultiPolygon::new(vec![]))
        }
        (_, true, SetOp::Intersection) => return Ok(MultiPolygon::new(vec![])),
        (_, true, _) => return union_contours(subj),
        (true, false, SetOp::Union) => return union_contours(clp),
        _ => {}
    }
    let shapes = guarded("polygon overlay", || {
        subj.overlay(&clp, op.rule(), FillRule::NonZero)
    })?;
    from_shapes(shapes)
}

fn position_in(geometry: &Geometry<f64>, p: &geo::Point<f64>) -> CoordPos {
    geometry.coordinate_position(&p.0)
}

fn points_where(
    points: &MultiPoint<f64>,
    other: &Geometry<f64>,
    keep: impl Fn(CoordPos) -> bool,
) -> Result<MultiPoint<f64>> {
    if points.0.is_empty() {
        return Ok(MultiPoint::new(vec![]));
    }
    guarded("point position", || {
        MultiPoint::new(
            points
                .0
                .iter()
                .copied()
                .filter(|p| keep(position_in(other, p)))
                .collect(),
        )
    })
}

fn clip_lines(
    polygons: &MultiPolygon<f64>,
    lines: &geo::MultiLineString<f64>,
    invert: bool,
) -> Result<geo::MultiLineString<f64>> {
    if lines.0.is_empty() {
        return Ok(geo::MultiLineString::new(vec![]));
    }
    if polygons.0.is_empty() {
        return Ok(if invert {
            lines.clone()
        } else {
            geo::MultiLineString::new(vec![])
        });
    }
    guarded("line clip", || polygons.clip(lines, invert))
}

pub(crate) fn intersects(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    if a.is_empty() || b.is_empty() {
        return Ok(false);
    }
    guarded("intersects", || a.intersects(b))
}

/// No point of `b` lies in the exterior of `a`.
pub(crate) fn covers(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    if a.is_empty() || b.is_empty() {
        return Ok(false);
    }
    let im = guarded("covers", || a.relate(b))?;
    Ok(im.get(CoordPos::Outside, CoordPos::Inside) == Dimensions::Empty
        && im.get(CoordPos::Outside, CoordPos::OnBoundary) == Dimensions::Empty)
}

pub(crate) fn contains(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    if a.is_empty() || b.is_empty() {
        return Ok(false);
    }
    let im = guarded("contains", || a.relate(b))?;
    Ok(im.is_contains())
}

pub(crate) fn intersection(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    if a.is_empty() || b.is_empty() {
        return Ok(geometry::empty());
    }
    let ca = Components::of(a);
    let cb = Components::of(b);
    let polygons = polygon_overlay(&ca.polygons, &cb.polygons, SetOp::Intersection)?;
    let mut lines = clip_lines(&cb.polygons, &ca.lines, false)?;
    lines.0.extend(clip_lines(&ca.polygons, &cb.lines, false)?.0);
    let mut points = points_where(&ca.points, b, |pos| pos != CoordPos::Outside)?;
    points.0.extend(points_where(&cb.points, a, |pos| pos != CoordPos::Outside)?.0);
    Ok(Components {
        polygons,
        lines,
        points,
    }
    .into_geometry())
}

pub(crate) fn union(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    let ca = Components::of(a);
    let cb = Components::of(b);
    let polygons = polygon_overlay(&ca.polygons, &cb.polygons, SetOp::Union)?;
    let mut all_lines = ca.lines;
    all_lines.0.extend(cb.lines.0);
    let lines = clip_lines(&polygons, &all_lines, true)?;
    let mut all_points = ca.points;
    all_points.0.extend(cb.points.0);
    let covered = Geometry::MultiPolygon(polygons.clone());
    let points = if polygons.0.is_empty() {
        all_points
    } else {
        points_where(&all_points, &covered, |pos| pos == CoordPos::Outside)?
    };
    Ok(Components {
        polygons,
        lines,
        points,
    }
    .into_geometry())
}

pub(crate) fn difference(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    if a.is_empty() {
        return Ok(geometry::empty());
    }
    let ca = Components::of(a);
    let cb = Components::of(b);
    let polygons = polygon_overlay(&ca.polygons, &cb.polygons, SetOp::Difference)?;
    let lines = clip_lines(&cb.polygons, &ca.lines, true)?;
    let points = if b.is_empty() {
        ca.points
    } else {
        points_where(&ca.points, b, |pos| pos == CoordPos::Outside)?
    };
    Ok(Components {
        polygons,
        lines,
        points,
    }
    .into_geometry())
}
