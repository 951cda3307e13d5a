//! Greedy line straightening inside an optional area.

use geo::{Coord, Geometry, LineString};

use crate::geometry;
use crate::safe_ops::PreparedOperand;

/// Drop intermediate vertices of `line` while the shortcut stays inside
/// `area`.
///
/// From the current anchor the ray end advances vertex by vertex. When the
/// shortcut leaves `area`, the previous vertex becomes the new anchor; a
/// single segment that already leaves `area` is kept as is. Vertices listed
/// in `keep` always survive. Lines with two or fewer vertices are returned
/// unchanged, and without an area every shortcut is accepted.
pub fn straighten_line(
    line: &LineString<f64>,
    area: Option<&Geometry<f64>>,
    keep: &[Coord<f64>],
) -> LineString<f64> {
    let coords = &line.0;
    if coords.len() <= 2 {
        return line.clone();
    }
    let area = area.map(PreparedOperand::new);
    let inside = |a: Coord<f64>, b: Coord<f64>| match &area {
        Some(area) => area.contains(&Geometry::LineString(geometry::make_line(&[a, b]))),
        None => true,
    };
    let last = coords.len() - 1;

    let mut out = vec![coords[0]];
    let mut start = 0;
    let mut ray = 1;
    loop {
        let end = coords[ray];
        if keep.contains(&end) {
            out.push(end);
            start = ray;
            ray = start + 1;
        } else if !inside(coords[start], end) {
            if ray == start + 1 {
                out.push(end);
                start = ray;
                ray = start + 1;
            } else {
                out.push(coords[ray - 1]);
                start = ray - 1;
            }
        } else {
            ray += 1;
        }
        if ray >= last {
            break;
        }
    }
    if !inside(coords[start], coords[ray]) && ray - 1 > start {
        out.push(coords[ray - 1]);
    }
    out.push(coords[ray]);
    LineString::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{buffer_planar, BufferStyle};
    use geo::{coord, line_string, polygon, BoundingRect};

    fn zigzag() -> LineString<f64> {
        line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 0.0), (x: 3.0, y: 1.0)]
    }

    #[test]
    fn wide_area_allows_the_shortcut() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 0.0)];
        let env = Geometry::Polygon(line.bounding_rect().unwrap().to_polygon());
        let area = buffer_planar(&env, 10.0, &BufferStyle::default()).unwrap();
        let out = straighten_line(&line, Some(&area), &[]);
        assert_eq!(out.0.len(), 2);
        assert!((out.0[0].x - 0.0).abs() < 0.1);
        assert!((out.0[1].x - 2.0).abs() < 0.1);
    }

    #[test]
    fn no_area_straightens_fully() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 0.0)];
        assert_eq!(straighten_line(&line, None, &[]).0.len(), 2);
    }

    #[test]
    fn two_point_line_is_untouched() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(straighten_line(&line, None, &[]), line);
    }

    #[test]
    fn kept_vertex_survives() {
        let line = zigzag();
        let out = straighten_line(&line, None, &[coord! {x: 2.0, y: 0.0}]);
        assert_eq!(out.0, vec![line.0[0], line.0[2], line.0[3]]);
    }

    #[test]
    fn last_vertex_outside_the_area() {
        let line = zigzag();
        let area = Geometry::Polygon(polygon![
            (x: -1.0, y: -1.0), (x: 2.5, y: -1.0), (x: 2.5, y: 5.0), (x: -1.0, y: 5.0),
        ]);
        let out = straighten_line(&line, Some(&area), &[]);
        assert_eq!(out.0, vec![line.0[0], line.0[2], line.0[3]]);
    }
}
