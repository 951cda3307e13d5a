//! Thin consumers of the metric, topology and safe-ops layers.
//!
//! - `grid`: geodesic point lattice inside an area.
//! - `spikes`: opening that drops parts narrower than a width.
//! - `angles`: corner cutting at sharp vertices.
//! - `split`: polygon faces after cutting with lines.
//! - `straighten`: greedy vertex removal constrained to an area.
//! - `border`: boundary rings and border segment queries.

mod angles;
mod border;
mod grid;
mod spikes;
mod split;
mod straighten;

pub use angles::remove_narrow_angles;
pub use border::{
    exterior_boundary, find_longest_border_segments, find_nearest_border_segment, hole_rings,
};
pub use grid::{generate_grid_point_geometries, generate_grid_points};
pub use spikes::remove_thin_spikes;
pub use split::split_polygon;
pub use straighten::straighten_line;
