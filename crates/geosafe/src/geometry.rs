//! Stateless constructors and structural helpers over `geo::Geometry`.
//!
//! Purpose
//! - Replace a shared builder factory with plain functions (all pure).
//! - Decompose geometries into single parts and back, classify shape kinds,
//!   and collapse homogeneous collections into their multi-shape form.

use geo::{
    Coord, Geometry, GeometryCollection, HasDimensions, LineString, MapCoords, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon,
};

/// Dimension class of a single-kind geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Point,
    Line,
    Polygon,
}

/// The canonical empty geometry.
#[inline]
pub fn empty() -> Geometry<f64> {
    Geometry::GeometryCollection(GeometryCollection(Vec::new()))
}

#[inline]
pub fn is_empty(geometry: &Geometry<f64>) -> bool {
    geometry.is_empty()
}

pub fn make_point(c: Coord<f64>) -> Point<f64> {
    Point::from(c)
}

/// Line through the given coordinates, in order.
pub fn make_line(coords: &[Coord<f64>]) -> LineString<f64> {
    LineString::new(coords.to_vec())
}

/// Appends the first coordinate when the ring is not already closed.
pub fn close_ring(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out = coords.to_vec();
    if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
        if first != last {
            out.push(*first);
        }
    }
    out
}

/// Polygon without holes from an open or closed ring.
pub fn make_polygon(coords: &[Coord<f64>]) -> Polygon<f64> {
    Polygon::new(LineString::new(close_ring(coords)), vec![])
}

/// Shape kind of a geometry, or `None` for mixed or empty collections.
pub fn shape_kind(geometry: &Geometry<f64>) -> Option<ShapeKind> {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Some(ShapeKind::Point),
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            Some(ShapeKind::Line)
        }
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => Some(ShapeKind::Polygon),
        Geometry::GeometryCollection(gc) => {
            let mut kinds = gc.0.iter().map(shape_kind);
            let first = kinds.next()??;
            kinds.all(|k| k == Some(first)).then_some(first)
        }
    }
}

/// Flatten a geometry into single parts: points, line strings and polygons.
pub fn parts(geometry: &Geometry<f64>) -> Vec<Geometry<f64>> {
    let mut out = Vec::new();
    push_parts(geometry, &mut out);
    out
}

fn push_parts(geometry: &Geometry<f64>, out: &mut Vec<Geometry<f64>>) {
    match geometry {
        Geometry::Point(p) => out.push(Geometry::Point(*p)),
        Geometry::Line(l) => out.push(Geometry::LineString(LineString::from(*l))),
        Geometry::LineString(ls) => out.push(Geometry::LineString(ls.clone())),
        Geometry::Polygon(p) => out.push(Geometry::Polygon(p.clone())),
        Geometry::Rect(r) => out.push(Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => out.push(Geometry::Polygon(t.to_polygon())),
        Geometry::MultiPoint(mp) => out.extend(mp.0.iter().map(|p| Geometry::Point(*p))),
        Geometry::MultiLineString(mls) => {
            out.extend(mls.0.iter().map(|ls| Geometry::LineString(ls.clone())))
        }
        Geometry::MultiPolygon(mp) => {
            out.extend(mp.0.iter().map(|p| Geometry::Polygon(p.clone())))
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                push_parts(g, out);
            }
        }
    }
}

/// More than one part after flattening.
pub fn is_multi_part(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::MultiPoint(mp) => mp.0.len() > 1,
        Geometry::MultiLineString(mls) => mls.0.len() > 1,
        Geometry::MultiPolygon(mp) => mp.0.len() > 1,
        Geometry::GeometryCollection(_) => parts(geometry).len() > 1,
        _ => false,
    }
}

/// Polygonal, linear and punctual content of an arbitrary geometry.
#[derive(Clone, Debug)]
pub struct Components {
    pub polygons: MultiPolygon<f64>,
    pub lines: MultiLineString<f64>,
    pub points: MultiPoint<f64>,
}

impl Default for Components {
    fn default() -> Self {
        Components {
            polygons: MultiPolygon::new(vec![]),
            lines: MultiLineString::new(vec![]),
            points: MultiPoint::new(vec![]),
        }
    }
}

impl Components {
    pub fn of(geometry: &Geometry<f64>) -> Self {
        let mut out = Components {
            polygons: MultiPolygon::new(vec![]),
            lines: MultiLineString::new(vec![]),
            points: MultiPoint::new(vec![]),
        };
        for part in parts(geometry) {
            match part {
                Geometry::Point(p) => out.points.0.push(p),
                Geometry::LineString(ls) => out.lines.0.push(ls),
                Geometry::Polygon(p) => out.polygons.0.push(p),
                _ => {}
            }
        }
        out
    }

    pub fn into_geometry(self) -> Geometry<f64> {
        let mut kept: Vec<Geometry<f64>> = Vec::with_capacity(3);
        if !self.polygons.is_empty() {
            kept.push(from_multi_polygon(self.polygons));
        }
        if !self.lines.is_empty() {
            kept.push(from_multi_line_string(self.lines));
        }
        if !self.points.is_empty() {
            kept.push(from_multi_point(self.points));
        }
        match kept.len() {
            0 => empty(),
            1 => kept.pop().unwrap_or_else(empty),
            _ => Geometry::GeometryCollection(GeometryCollection(kept)),
        }
    }
}

/// Single polygon when only one part remains.
pub fn from_multi_polygon(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        Geometry::Polygon(mp.0.remove(0))
    } else {
        Geometry::MultiPolygon(mp)
    }
}

fn from_multi_line_string(mut mls: MultiLineString<f64>) -> Geometry<f64> {
    if mls.0.len() == 1 {
        Geometry::LineString(mls.0.remove(0))
    } else {
        Geometry::MultiLineString(mls)
    }
}

fn from_multi_point(mp: MultiPoint<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        Geometry::Point(mp.0[0])
    } else {
        Geometry::MultiPoint(mp)
    }
}

/// Collapse a collection whose parts share one kind into the matching multi-shape.
/// Returns `None` for mixed content.
pub fn collapse_homogeneous(geometry: &Geometry<f64>) -> Option<Geometry<f64>> {
    let flat = parts(geometry);
    let Some(kind) = shape_kind(geometry) else {
        return flat.is_empty().then(empty);
    };
    let out = match kind {
        ShapeKind::Point => Geometry::MultiPoint(MultiPoint::new(
            flat.into_iter()
                .filter_map(|g| match g {
                    Geometry::Point(p) => Some(p),
                    _ => None,
                })
                .collect(),
        )),
        ShapeKind::Line => Geometry::MultiLineString(MultiLineString::new(
            flat.into_iter()
                .filter_map(|g| match g {
                    Geometry::LineString(ls) => Some(ls),
                    _ => None,
                })
                .collect(),
        )),
        ShapeKind::Polygon => Geometry::MultiPolygon(MultiPolygon::new(
            flat.into_iter()
                .filter_map(|g| match g {
                    Geometry::Polygon(p) => Some(p),
                    _ => None,
                })
                .collect(),
        )),
    };
    Some(out)
}

/// Recombine non-empty parts into one geometry.
pub fn recombine(parts: Vec<Geometry<f64>>) -> Geometry<f64> {
    let gc = Geometry::GeometryCollection(GeometryCollection(parts));
    match collapse_homogeneous(&gc) {
        Some(Geometry::MultiPolygon(mp)) => from_multi_polygon(mp),
        Some(g) => g,
        None => gc,
    }
}

/// Swap x and y of every coordinate, producing a new geometry.
pub fn swap_axes(geometry: &Geometry<f64>) -> Geometry<f64> {
    geometry.map_coords(|c| Coord { x: c.y, y: c.x })
}

/// All coordinates finite.
pub fn is_finite(geometry: &Geometry<f64>) -> bool {
    use geo::CoordsIter;
    geometry
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
}
