//! Split polygons into faces along cutting lines.

use geo::{Geometry, MultiLineString, Polygon};
use tracing::debug;

use crate::error::{GeoError, Result};
use crate::geometry::{self, Components};
use crate::kernel::overlay;

/// Parts of the polygonal content of `g` after cutting it with `lines`.
///
/// Lines are used as open paths in the coordinates of `g`. A line has to
/// cross a part from boundary to boundary to split it; dangling ends inside
/// a part are ignored. Holes stay holes of the part that surrounds them.
/// Non-polygonal input is an argument error.
pub fn split_polygon(g: &Geometry<f64>, lines: &[Geometry<f64>]) -> Result<Vec<Polygon<f64>>> {
    let comps = Components::of(g);
    if comps.polygons.0.is_empty() {
        if geometry::is_empty(g) {
            return Ok(Vec::new());
        }
        return Err(GeoError::argument("split_polygon needs a polygonal geometry"));
    }
    let mut cuts = MultiLineString::new(vec![]);
    for line in lines {
        cuts.0.extend(Components::of(line).lines.0);
    }
    let faces = overlay::slice_by_paths(&comps.polygons, &cuts)?;
    debug!(cuts = cuts.0.len(), faces = faces.0.len(), "split polygon");
    Ok(faces.0)
}
