//! Curated flat API (UNSTABLE).
//!
//! Important
//! - A convenience surface for the CLI and benches; names may move between
//!   modules without notice.
//! - The geodesic `metric::make_line` is exported as `make_geodesic_line` to
//!   keep `make_line` for the coordinate constructor.

// Constructors and structure
pub use crate::geometry::{
    close_ring, collapse_homogeneous, empty, is_empty, make_line, make_point, make_polygon, parts,
    recombine, shape_kind, swap_axes, Components, ShapeKind,
};
// Frames
pub use crate::projection::{LocalProjection, PlanarFrame, TransverseMercator, WebMercator};
// Metric operations
pub use crate::metric::{
    angle_between, area, azimuth, azimuth_of_line, buffer, buffer_planar, destination_point,
    distance, geodesic_distance, increase_line_length, length, length_of, make_aabb, make_circle,
    make_line as make_geodesic_line, min_width, nearest_point, nearest_points, normalize_azimuth,
    simplify_projected, BufferStyle, CapStyle, JoinStyle,
};
// Topology
pub use crate::topology::{
    diagnose, fix_geometry, is_valid, normalize, prepare, repair, TopologyCfg,
};
// Safe boolean operations
pub use crate::safe_ops::{
    safe_contains, safe_covers, safe_difference, safe_intersection, safe_intersects, safe_union,
    safe_union_all, PreparedOperand, SafeOpsCfg,
};
// Lloyd relaxation
pub use crate::relax::{
    generate_lloyd_points, generate_lloyd_points_geographic, generate_lloyd_points_geographic_with,
    generate_lloyd_points_with, RelaxCfg, RelaxPhase, RelaxationState, SeedToken,
};
// Consumers
pub use crate::algorithms::{
    exterior_boundary, find_longest_border_segments, find_nearest_border_segment,
    generate_grid_points, hole_rings, remove_narrow_angles, remove_thin_spikes, split_polygon,
    straighten_line,
};
