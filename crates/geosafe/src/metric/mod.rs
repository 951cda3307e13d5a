//! Projection-aware metric operations on geographic geometries.
//!
//! Purpose
//! - Buffer, measure and place points in meters for lon/lat input.
//! - Every metric-sensitive computation runs in a `LocalProjection` anchored
//!   at the geometry; results are converted back to lon/lat.
//!
//! Failure policy
//! - Projection and kernel errors never escape: `buffer` returns its input,
//!   `area`/`length` fall back to the raw-frame measurement, nearest-point
//!   queries return `None`. Each fallback is logged at `warn`.
//! - Argument errors (wrong coordinate arity) are returned to the caller.

mod geodesic;
mod nearest;
mod offset;

pub use geodesic::{
    azimuth, azimuth_of_line, destination_point, geodesic_distance, make_line, normalize_azimuth,
};
pub use nearest::{angle_between_planar, min_width_planar, nearest_points_planar};
pub use offset::{buffer_planar, BufferStyle, CapStyle, JoinStyle};

use geo::{
    Area, Coord, EuclideanLength, Geometry, LineString, MultiLineString, MultiPolygon, Polygon,
    SimplifyVwPreserve,
};
use tracing::warn;

use crate::error::{GeoError, Result};
use crate::geometry;
use crate::kernel::guarded;
use crate::projection::{LocalProjection, PlanarFrame, WebMercator};

/// Buffer by `meters` around `g`, in a frame anchored at `g`.
///
/// Empty input gives empty output; any failure returns `g` unchanged.
pub fn buffer(g: &Geometry<f64>, meters: f64, style: &BufferStyle) -> Geometry<f64> {
    if geometry::is_empty(g) {
        return geometry::empty();
    }
    match LocalProjection::for_geometry(g) {
        Ok(frame) => buffer_in(&frame, g, meters, style),
        Err(e) => {
            warn!(error = %e, "buffer: no local frame, returning input");
            g.clone()
        }
    }
}

/// Buffer in a caller-supplied frame.
pub fn buffer_in(
    frame: &LocalProjection,
    g: &Geometry<f64>,
    meters: f64,
    style: &BufferStyle,
) -> Geometry<f64> {
    if geometry::is_empty(g) {
        return geometry::empty();
    }
    let run = || -> Result<Geometry<f64>> {
        let local = frame.forward(g)?;
        let out = buffer_planar(&local, meters, style)?;
        if geometry::is_empty(&out) {
            return Ok(out);
        }
        frame.inverse(&out)
    };
    match run() {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, meters, "buffer failed, returning input");
            g.clone()
        }
    }
}

/// Polygon approximating a circle of `radius` meters around `center`.
pub fn make_circle(center: Coord<f64>, radius: f64, style: &BufferStyle) -> Geometry<f64> {
    buffer(&Geometry::Point(geometry::make_point(center)), radius, style)
}

/// Axis-aligned box of `width` x `height` meters centered on `center`.
pub fn make_aabb(center: Coord<f64>, width: f64, height: f64) -> Result<Polygon<f64>> {
    if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
        return Err(GeoError::argument(format!("box size {width} x {height} is invalid")));
    }
    let frame = LocalProjection::at(center)?;
    let (hw, hh) = (width / 2.0, height / 2.0);
    let local = geometry::make_polygon(&[
        Coord { x: -hw, y: -hh },
        Coord { x: hw, y: -hh },
        Coord { x: hw, y: hh },
        Coord { x: -hw, y: hh },
    ]);
    frame.inverse(&local)
}

/// Area in square meters.
pub fn area(g: &Geometry<f64>) -> f64 {
    if geometry::is_empty(g) {
        return 0.0;
    }
    let projected = LocalProjection::for_geometry(g).and_then(|frame| frame.forward(g));
    match projected {
        Ok(local) => local.unsigned_area(),
        Err(e) => {
            warn!(error = %e, "area: projection failed, measuring in degrees");
            g.unsigned_area()
        }
    }
}

/// Length in meters.
pub fn length(line: &LineString<f64>) -> f64 {
    if line.0.is_empty() {
        return 0.0;
    }
    let g = Geometry::LineString(line.clone());
    let projected = LocalProjection::for_geometry(&g).and_then(|frame| frame.forward(line));
    match projected {
        Ok(local) => local.euclidean_length(),
        Err(e) => {
            warn!(error = %e, "length: projection failed, measuring in degrees");
            line.euclidean_length()
        }
    }
}

/// Total length in meters of all linear parts (polygon boundaries excluded).
pub fn length_of(g: &Geometry<f64>) -> f64 {
    geometry::Components::of(g).lines.0.iter().map(length).sum()
}

/// Extend a two-point line collinearly by `fraction` of its length, half at
/// each end, in the raw coordinate frame.
pub fn increase_line_length_planar(
    line: &LineString<f64>,
    fraction: f64,
) -> Result<LineString<f64>> {
    let [a, b] = line.0.as_slice() else {
        return Err(GeoError::argument(format!(
            "line with 2 coordinates expected; {} coordinates provided",
            line.0.len()
        )));
    };
    let dx = (b.x - a.x) * fraction / 2.0;
    let dy = (b.y - a.y) * fraction / 2.0;
    Ok(LineString::new(vec![
        Coord { x: a.x - dx, y: a.y - dy },
        Coord { x: b.x + dx, y: b.y + dy },
    ]))
}

/// Metric version of `increase_line_length_planar`; the extension is measured
/// in meters. Projection failure returns the line unchanged.
pub fn increase_line_length(line: &LineString<f64>, fraction: f64) -> Result<LineString<f64>> {
    if line.0.len() != 2 {
        return increase_line_length_planar(line, fraction);
    }
    let g = Geometry::LineString(line.clone());
    let run = || -> Result<LineString<f64>> {
        let frame = LocalProjection::for_geometry(&g)?;
        let local = frame.forward(line)?;
        let longer = increase_line_length_planar(&local, fraction)?;
        frame.inverse(&longer)
    };
    match run() {
        Ok(out) => Ok(out),
        Err(e) if !e.is_recoverable() => Err(e),
        Err(e) => {
            warn!(error = %e, "increase_line_length failed, returning input");
            Ok(line.clone())
        }
    }
}

fn simplify_vw(g: &Geometry<f64>, eps: f64) -> Geometry<f64> {
    match g {
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify_vw_preserve(&eps)),
        Geometry::MultiLineString(mls) => {
            Geometry::MultiLineString(MultiLineString::new(
                mls.0.iter().map(|ls| ls.simplify_vw_preserve(&eps)).collect(),
            ))
        }
        Geometry::Polygon(p) => Geometry::Polygon(p.simplify_vw_preserve(&eps)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon::new(
            mp.0.iter().map(|p| p.simplify_vw_preserve(&eps)).collect(),
        )),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(geo::GeometryCollection(
            gc.0.iter().map(|part| simplify_vw(part, eps)).collect(),
        )),
        other => other.clone(),
    }
}

/// Topology-preserving simplification with a tolerance in (Web Mercator) meters.
///
/// Runs in the global frame, so the tolerance is only a ground distance near
/// the equator. Vertices whose effective triangle is smaller than `meters²`
/// are removed.
pub fn simplify_projected(g: &Geometry<f64>, meters: f64) -> Geometry<f64> {
    if geometry::is_empty(g) {
        return geometry::empty();
    }
    let wm = WebMercator;
    let run = || -> Result<Geometry<f64>> {
        let projected = wm.forward(g)?;
        let simplified = guarded("simplify", || simplify_vw(&projected, meters * meters))?;
        wm.inverse(&simplified)
    };
    match run() {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "simplify_projected failed, returning input");
            g.clone()
        }
    }
}

/// Nearest pair of points `(on g1, on g2)`, found in the frame of `g1`.
pub fn nearest_points(g1: &Geometry<f64>, g2: &Geometry<f64>) -> Option<(Coord<f64>, Coord<f64>)> {
    if geometry::is_empty(g1) || geometry::is_empty(g2) {
        warn!("nearest_points called with an empty geometry");
        return None;
    }
    let run = || -> Result<Option<(Coord<f64>, Coord<f64>)>> {
        let frame = LocalProjection::for_geometry(g1)?;
        nearest_points_in(&frame, g1, g2)
    };
    match run() {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "nearest_points failed");
            None
        }
    }
}

/// Nearest pair in a caller-supplied frame.
pub fn nearest_points_in(
    frame: &LocalProjection,
    g1: &Geometry<f64>,
    g2: &Geometry<f64>,
) -> Result<Option<(Coord<f64>, Coord<f64>)>> {
    let l1 = frame.forward(g1)?;
    let l2 = frame.forward(g2)?;
    match nearest_points_planar(&l1, &l2) {
        Some((a, b)) => Ok(Some((frame.inverse_coord(a)?, frame.inverse_coord(b)?))),
        None => Ok(None),
    }
}

/// Point of `g` closest to `c`.
pub fn nearest_point(c: Coord<f64>, g: &Geometry<f64>) -> Option<Coord<f64>> {
    nearest_points(&Geometry::Point(geometry::make_point(c)), g).map(|(_, on_g)| on_g)
}

/// Geodesic distance in meters between the nearest points; 0 for empty input.
pub fn distance(g1: &Geometry<f64>, g2: &Geometry<f64>) -> f64 {
    if geometry::is_empty(g1) || geometry::is_empty(g2) {
        return 0.0;
    }
    match nearest_points(g1, g2) {
        Some((a, b)) => geodesic_distance(a, b),
        None => 0.0,
    }
}

/// Minimum width in meters.
pub fn min_width(g: &Geometry<f64>) -> f64 {
    if geometry::is_empty(g) {
        return 0.0;
    }
    match LocalProjection::for_geometry(g).and_then(|frame| frame.forward(g)) {
        Ok(local) => min_width_planar(&local),
        Err(e) => {
            warn!(error = %e, "min_width: projection failed, measuring in degrees");
            min_width_planar(g)
        }
    }
}

/// Unoriented angle at `middle` (radians), measured in the frame of `middle`.
pub fn angle_between(a: Coord<f64>, middle: Coord<f64>, b: Coord<f64>) -> f64 {
    let run = || -> Result<f64> {
        let frame = LocalProjection::for_coord(middle)?;
        Ok(angle_between_planar(
            frame.forward_coord(a)?,
            frame.forward_coord(middle)?,
            frame.forward_coord(b)?,
        ))
    };
    match run() {
        Ok(angle) => angle,
        Err(e) => {
            warn!(error = %e, "angle_between: projection failed, measuring in degrees");
            angle_between_planar(a, middle, b)
        }
    }
}

#[cfg(test)]
mod tests;
