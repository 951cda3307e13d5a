//! Boundary extraction and border segment queries (planar).

use geo::{
    Coord, EuclideanDistance, EuclideanLength, Geometry, Line, LineString, MultiLineString, Point,
};

use crate::error::{GeoError, Result};
use crate::geometry::Components;

fn segments(g: &Geometry<f64>) -> Vec<Line<f64>> {
    let comps = Components::of(g);
    let mut out = Vec::new();
    for p in &comps.polygons.0 {
        out.extend(p.exterior().lines());
        for hole in p.interiors() {
            out.extend(hole.lines());
        }
    }
    for l in &comps.lines.0 {
        out.extend(l.lines());
    }
    out
}

/// Boundary or line segment of `g` closest to `point`. Ties keep the first.
pub fn find_nearest_border_segment(g: &Geometry<f64>, point: Coord<f64>) -> Option<Line<f64>> {
    let p = Point::from(point);
    segments(g)
        .into_iter()
        .map(|s| (p.euclidean_distance(&s), s))
        .fold(None, |best: Option<(f64, Line<f64>)>, (d, s)| match best {
            Some((bd, _)) if bd <= d => best,
            _ => Some((d, s)),
        })
        .map(|(_, s)| s)
}

/// Up to `limit` longest segments of `g`, longest first.
pub fn find_longest_border_segments(g: &Geometry<f64>, limit: usize) -> Vec<Line<f64>> {
    let mut all = segments(g);
    all.sort_by(|a, b| b.euclidean_length().total_cmp(&a.euclidean_length()));
    all.truncate(limit);
    all
}

/// Outer rings of the polygonal parts of `area`.
///
/// A single polygon gives its exterior `LineString`; anything else with
/// polygons gives a `MultiLineString`. Fails with `Argument` when `area` has
/// no polygon.
pub fn exterior_boundary(area: &Geometry<f64>) -> Result<Geometry<f64>> {
    let rings: Vec<LineString<f64>> = match area {
        Geometry::Polygon(p) => return Ok(Geometry::LineString(p.exterior().clone())),
        Geometry::Rect(r) => return Ok(Geometry::LineString(r.to_polygon().exterior().clone())),
        Geometry::Triangle(t) => return Ok(Geometry::LineString(t.to_polygon().exterior().clone())),
        Geometry::MultiPolygon(_) | Geometry::GeometryCollection(_) => Components::of(area)
            .polygons
            .0
            .iter()
            .map(|p| p.exterior().clone())
            .collect(),
        _ => Vec::new(),
    };
    if rings.is_empty() {
        return Err(GeoError::argument("boundary needs a polygonal geometry"));
    }
    Ok(Geometry::MultiLineString(MultiLineString::new(rings)))
}

/// Every hole ring of the polygonal parts of `area`.
pub fn hole_rings(area: &Geometry<f64>) -> MultiLineString<f64> {
    MultiLineString::new(
        Components::of(area)
            .polygons
            .0
            .iter()
            .flat_map(|p| p.interiors().iter().cloned())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string, point, polygon, Polygon};

    fn framed() -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(
            line_string![
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 4.0),
                (x: 0.0, y: 4.0),
                (x: 0.0, y: 0.0),
            ],
            vec![line_string![
                (x: 1.0, y: 1.0),
                (x: 2.0, y: 1.0),
                (x: 2.0, y: 2.0),
                (x: 1.0, y: 2.0),
                (x: 1.0, y: 1.0),
            ]],
        ))
    }

    #[test]
    fn nearest_segment_includes_holes() {
        let near_top = find_nearest_border_segment(&framed(), coord! {x: 5.0, y: 3.9}).unwrap();
        assert_eq!(near_top, Line::new(coord! {x: 10.0, y: 4.0}, coord! {x: 0.0, y: 4.0}));
        let near_hole = find_nearest_border_segment(&framed(), coord! {x: 1.5, y: 1.6}).unwrap();
        assert_eq!(near_hole, Line::new(coord! {x: 2.0, y: 2.0}, coord! {x: 1.0, y: 2.0}));
        let point = Geometry::Point(point!(x: 0.0, y: 0.0));
        assert!(find_nearest_border_segment(&point, coord! {x: 1.0, y: 1.0}).is_none());
    }

    #[test]
    fn longest_segments_first() {
        let top = find_longest_border_segments(&framed(), 2);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|l| (l.euclidean_length() - 10.0).abs() < 1e-12));
        assert_eq!(find_longest_border_segments(&framed(), 100).len(), 8);
    }

    #[test]
    fn boundary_of_polygons_and_collections() {
        let single = exterior_boundary(&framed()).unwrap();
        assert!(matches!(single, Geometry::LineString(ref l) if l.0.len() == 5));
        let gc = Geometry::GeometryCollection(geo::GeometryCollection::new_from(vec![
            framed(),
            Geometry::Polygon(polygon![(x: 20.0, y: 0.0), (x: 21.0, y: 0.0), (x: 21.0, y: 1.0)]),
            Geometry::Point(point!(x: 5.0, y: 5.0)),
        ]));
        assert!(matches!(
            exterior_boundary(&gc).unwrap(),
            Geometry::MultiLineString(ref m) if m.0.len() == 2
        ));
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        assert!(matches!(exterior_boundary(&line), Err(GeoError::Argument(_))));
    }

    #[test]
    fn holes_are_collected() {
        assert_eq!(hole_rings(&framed()).0.len(), 1);
        let plain =
            Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]);
        assert!(hole_rings(&plain).0.is_empty());
    }
}
