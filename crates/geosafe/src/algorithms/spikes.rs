//! Morphological opening that drops parts narrower than a width.

use geo::Geometry;
use tracing::debug;

use crate::geometry;
use crate::metric::{buffer, simplify_projected, BufferStyle, CapStyle, JoinStyle};
use crate::safe_ops::safe_intersection;

/// Remove spikes and corridors of `g` narrower than `min_width` meters.
///
/// Erodes by `min_width / 2`, dilates back with square caps and mitre joins,
/// intersects with `g` so nothing grows beyond the input, then simplifies
/// with a 5 m tolerance. Returns `None` when nothing survives the erosion.
pub fn remove_thin_spikes(g: &Geometry<f64>, min_width: f64) -> Option<Geometry<f64>> {
    let half = min_width / 2.0;
    let eroded = buffer(g, -half, &BufferStyle::default());
    if geometry::is_empty(&eroded) {
        debug!(min_width, "nothing left after erosion");
        return None;
    }
    let sharp = BufferStyle::default()
        .with_cap(CapStyle::Square)
        .with_join(JoinStyle::Mitre);
    let dilated = buffer(&eroded, half, &sharp);
    let opened = safe_intersection(&dilated, g);
    Some(simplify_projected(&opened, 5.0))
}
