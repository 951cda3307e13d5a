//! Heuristic repair for the two dominant defect classes.

use geo::{Geometry, MultiPolygon, Polygon};
use tracing::debug;

use super::{diagnose_with, TopologyCfg};
use crate::error::{GeoError, Result, ValidityError, ValidityErrorKind};
use crate::geometry;
use crate::kernel::overlay::{self, SetOp};
use crate::metric::{buffer_planar, BufferStyle};

/// Zero-distance buffer: re-nodes self-crossings into a valid boundary.
pub(crate) fn zero_buffer(g: &Geometry<f64>) -> Result<Geometry<f64>> {
    buffer_planar(g, 0.0, &BufferStyle::default())
}

/// Shell as a standalone polygon minus every hole, one at a time.
fn subtract_holes(p: &Polygon<f64>) -> Result<Geometry<f64>> {
    let mut acc = MultiPolygon::new(vec![Polygon::new(p.exterior().clone(), vec![])]);
    for hole in p.interiors() {
        let cut = MultiPolygon::new(vec![Polygon::new(hole.clone(), vec![])]);
        acc = overlay::polygon_overlay(&acc, &cut, SetOp::Difference)?;
        if acc.0.is_empty() {
            break;
        }
    }
    Ok(geometry::from_multi_polygon(acc))
}

pub(crate) fn repair_with(
    g: &Geometry<f64>,
    error: &ValidityError,
    cfg: &TopologyCfg,
) -> Result<Geometry<f64>> {
    let attempt = match error.kind {
        ValidityErrorKind::SelfIntersection | ValidityErrorKind::RingSelfIntersection => {
            debug!(kind = ?error.kind, "repair: zero-distance buffer");
            zero_buffer(g)
        }
        ValidityErrorKind::HoleOutsideShell => match g {
            Geometry::Polygon(p) => {
                debug!(holes = p.interiors().len(), "repair: subtracting holes from shell");
                subtract_holes(p)
            }
            _ => {
                return Err(GeoError::repair_failed(
                    "hole outside shell is only repaired on a single polygon",
                ))
            }
        },
        ValidityErrorKind::Other => {
            return Err(GeoError::repair_failed(format!("no repair for {error}")));
        }
    };
    let fixed = attempt.map_err(|e| GeoError::repair_failed(e.to_string()))?;
    match diagnose_with(&fixed, cfg) {
        None => Ok(fixed),
        Some(still) => Err(GeoError::repair_failed(format!(
            "repair of {:?} left {still}",
            error.kind
        ))),
    }
}
