//! Regular point lattice walked geodesically over a lon/lat area.

use geo::{BoundingRect, Coord, Geometry, Point};

use crate::error::{GeoError, Result};
use crate::geometry;
use crate::metric::destination_point;
use crate::projection::{LocalProjection, PlanarFrame};
use crate::safe_ops::PreparedOperand;

/// Fold an angle into `[0, 90]`: negative angles into `[0, 90)`, angles
/// above 90 into `(0, 90]`.
pub(crate) fn fold_quadrant(angle: f64) -> f64 {
    if angle < 0.0 {
        angle.rem_euclid(90.0)
    } else if angle > 90.0 {
        90.0 - (90.0 - angle).rem_euclid(90.0)
    } else {
        angle
    }
}

/// Lattice points with `step_meters` spacing inside `bounds`.
///
/// The walk starts at the south-west corner of the envelope and advances
/// along `main_angle` (degrees from north, folded into `[0, 90]`) while the
/// travelled distance is below the envelope diagonal. From every station it
/// steps to both sides, perpendicular to the main direction, while the side
/// offset is below the larger envelope side. Only points inside `bounds` are
/// kept.
pub fn generate_grid_points(
    bounds: &Geometry<f64>,
    step_meters: f64,
    main_angle: f64,
) -> Result<Vec<Coord<f64>>> {
    if !(step_meters.is_finite() && step_meters > 0.0) {
        return Err(GeoError::argument(format!("grid step must be positive, got {step_meters}")));
    }
    if !main_angle.is_finite() {
        return Err(GeoError::argument("grid angle is not finite"));
    }
    let Some(envelope) = bounds.bounding_rect() else {
        return Ok(Vec::new());
    };
    let frame = LocalProjection::for_geometry(bounds)?;
    let local = frame
        .forward(&Geometry::Polygon(envelope.to_polygon()))?
        .bounding_rect()
        .ok_or_else(|| GeoError::projection("envelope vanished in the local frame"))?;
    let side = local.width().max(local.height());
    let diagonal = local.width().hypot(local.height());

    let area = PreparedOperand::new(bounds);
    let inside = |c: Coord<f64>| area.contains(&Geometry::Point(geometry::make_point(c)));
    let angle = fold_quadrant(main_angle);

    let mut out = Vec::new();
    let mut station = envelope.min();
    let mut travelled = 0.0;
    loop {
        if inside(station) {
            out.push(station);
        }
        for turn in [90.0, -90.0] {
            let mut k = 1.0;
            loop {
                let c = destination_point(station, step_meters * k, angle + turn);
                if inside(c) {
                    out.push(c);
                }
                k += 1.0;
                if step_meters * k >= side {
                    break;
                }
            }
        }
        station = destination_point(station, step_meters, angle);
        travelled += step_meters;
        if travelled >= diagonal {
            break;
        }
    }
    Ok(out)
}

/// `generate_grid_points` as `Point`s.
pub fn generate_grid_point_geometries(
    bounds: &Geometry<f64>,
    step_meters: f64,
    main_angle: f64,
) -> Result<Vec<Point<f64>>> {
    Ok(generate_grid_points(bounds, step_meters, main_angle)?
        .into_iter()
        .map(geometry::make_point)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::geodesic_distance;
    use geo::coord;

    fn block() -> Geometry<f64> {
        Geometry::Polygon(geometry::make_polygon(&[
            coord! {x: 30.529_875_152_102_818, y: 59.901_741_252_820_3},
            coord! {x: 30.529_768_819_463_612, y: 59.897_741_699_664_55},
            coord! {x: 30.537_177_463_764_948, y: 59.897_668_578_563_78},
            coord! {x: 30.537_094_135_302_652, y: 59.899_803_611_085_986},
            coord! {x: 30.533_053_495_003_486, y: 59.899_821_386_839_76},
            coord! {x: 30.533_088_939_216_583, y: 59.901_634_463_755_3},
        ]))
    }

    #[test]
    fn angle_changes_the_lattice() {
        let straight = generate_grid_points(&block(), 10.0, 0.0).unwrap();
        let rotated = generate_grid_points(&block(), 10.0, 20.0).unwrap();
        assert!(!straight.is_empty());
        assert!(!rotated.is_empty());
        assert_ne!(straight.len(), rotated.len());
    }

    #[test]
    fn neighbours_are_one_step_apart() {
        let pts = generate_grid_points(&block(), 25.0, 0.0).unwrap();
        assert!(pts.len() > 10);
        let p = pts[pts.len() / 2];
        let nearest = pts
            .iter()
            .filter(|q| **q != p)
            .map(|q| geodesic_distance(p, *q))
            .fold(f64::INFINITY, f64::min);
        assert!((nearest - 25.0).abs() < 0.5, "nearest = {nearest}");
        let area = PreparedOperand::new(&block());
        assert!(pts
            .iter()
            .all(|c| area.contains(&Geometry::Point(geometry::make_point(*c)))));
    }

    #[test]
    fn bad_arguments_and_empty_bounds() {
        assert!(matches!(generate_grid_points(&block(), 0.0, 0.0), Err(GeoError::Argument(_))));
        assert!(matches!(
            generate_grid_points(&block(), 10.0, f64::NAN),
            Err(GeoError::Argument(_))
        ));
        assert!(generate_grid_points(&geometry::empty(), 10.0, 0.0).unwrap().is_empty());
    }

    #[test]
    fn quadrant_folding() {
        let cases = [
            (-10.0, 80.0),
            (0.0, 0.0),
            (45.0, 45.0),
            (90.0, 90.0),
            (100.0, 10.0),
            (180.0, 90.0),
            (-90.0, 0.0),
        ];
        for (input, expected) in cases {
            assert!((fold_quadrant(input) - expected).abs() < 1e-12, "{input}");
        }
    }
}
