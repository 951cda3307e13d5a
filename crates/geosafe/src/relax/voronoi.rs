//! Voronoi neighbourhoods from a Delaunay triangulation.

use geo::Coord;
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, Point2, Triangulation};
use tracing::warn;

/// Delaunay neighbours of every site, in input order.
///
/// Coincident sites share one triangulation vertex and therefore the same
/// neighbour set. A site the triangulation rejects gets no neighbours.
pub(crate) fn neighbours(sites: &[Coord<f64>]) -> Vec<Vec<Coord<f64>>> {
    let mut tri: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    let handles: Vec<Option<FixedVertexHandle>> = sites
        .iter()
        .map(|c| match tri.insert(Point2::new(c.x, c.y)) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!(x = c.x, y = c.y, error = ?e, "site rejected by triangulation");
                None
            }
        })
        .collect();
    handles
        .into_iter()
        .map(|h| match h {
            Some(h) => tri
                .vertex(h)
                .out_edges()
                .map(|e| {
                    let p = e.to().position();
                    Coord { x: p.x, y: p.y }
                })
                .collect(),
            None => Vec::new(),
        })
        .collect()
}
