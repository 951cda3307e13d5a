//! Geodesic bearings, distances and point placement on WGS84.
//!
//! These never go through a local frame: bearings must stay accurate far from
//! any anchor, so they are solved on the ellipsoid (Karney).

use geo::{Coord, GeodesicBearing, GeodesicDestination, GeodesicDistance, LineString, Point};

use crate::error::{GeoError, Result};

/// Fold an azimuth in degrees into [0, 360).
#[inline]
pub fn normalize_azimuth(a: f64) -> f64 {
    let r = a.rem_euclid(360.0);
    // rem_euclid rounds up to exactly 360 for tiny negative inputs.
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Initial geodesic bearing from `c1` to `c2`, degrees clockwise from north in [0, 360).
pub fn azimuth(c1: Coord<f64>, c2: Coord<f64>) -> f64 {
    normalize_azimuth(Point::from(c1).geodesic_bearing(Point::from(c2)))
}

/// Bearing of a two-point line; an empty line has bearing 0.
pub fn azimuth_of_line(line: &LineString<f64>) -> Result<f64> {
    match line.0.as_slice() {
        [] => Ok(0.0),
        [a, b] => Ok(azimuth(*a, *b)),
        other => Err(GeoError::argument(format!(
            "line with 2 coordinates expected; {} coordinates provided",
            other.len()
        ))),
    }
}

/// Point reached after `distance` meters along bearing `azimuth_deg` from `start`.
pub fn destination_point(start: Coord<f64>, distance: f64, azimuth_deg: f64) -> Coord<f64> {
    Point::from(start).geodesic_destination(azimuth_deg, distance).0
}

/// Ellipsoidal (orthodromic) distance in meters.
pub fn geodesic_distance(c1: Coord<f64>, c2: Coord<f64>) -> f64 {
    Point::from(c1).geodesic_distance(&Point::from(c2))
}

/// Two-point geodesic line of `length` meters starting at `start` along `azimuth_deg`.
pub fn make_line(start: Coord<f64>, azimuth_deg: f64, length: f64) -> LineString<f64> {
    LineString::new(vec![start, destination_point(start, length, azimuth_deg)])
}
