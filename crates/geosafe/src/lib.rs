//! Robust 2D geometry for geographic (lon/lat) data.
//!
//! Layers, leaves first:
//! - `projection`: local planar frames (transverse Mercator) and Web Mercator.
//! - `metric`: buffer, area, length and geodesic placement in meters.
//! - `topology`: validity diagnosis, repair and collection normalization.
//! - `safe_ops`: boolean predicates and set operations that repair their
//!   operands and retry with a perturbed operand before failing soft.
//! - `relax`: Lloyd relaxation for evenly spaced points inside an area.
//! - `algorithms`: grid points, thin-spike removal, line straightening.
//!
//! Failure Policy
//! - Only `GeoError::Argument` reaches callers of the lon/lat operations;
//!   projection and kernel failures degrade to a usable result and are
//!   logged through `tracing`.

pub mod algorithms;
pub mod api;
pub mod error;
pub mod geometry;
pub(crate) mod kernel;
pub mod metric;
pub mod projection;
pub mod relax;
pub mod safe_ops;
pub mod topology;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{GeoError, Result, ValidityError, ValidityErrorKind};
pub use geo::{Coord, Geometry};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{GeoError, Result, ValidityError, ValidityErrorKind};
    pub use crate::metric::{area, buffer, length, BufferStyle, CapStyle, JoinStyle};
    pub use crate::projection::{LocalProjection, PlanarFrame};
    pub use crate::relax::{generate_lloyd_points_geographic, RelaxCfg, SeedToken};
    pub use crate::safe_ops::{
        safe_contains, safe_covers, safe_difference, safe_intersection, safe_intersects,
        safe_union, PreparedOperand, SafeOpsCfg,
    };
    pub use crate::topology::{diagnose, fix_geometry, repair};
    pub use geo::{Coord, Geometry};
}
