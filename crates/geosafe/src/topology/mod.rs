//! Topology diagnosis and repair.
//!
//! Purpose
//! - Detect structural defects (`diagnose`) and repair the ones boolean set
//!   algebra cannot tolerate (`repair`): self-intersections via a zero-distance
//!   buffer, holes outside the shell via shell-minus-holes.
//! - Normalize heterogeneous collections before predicates run on them.
//!
//! Failure policy
//! - `repair` returns `GeoError::RepairFailed`; the caller picks the fallback.
//!   `fix_geometry` keeps the original geometry in that case.

mod repair;
mod validity;

use geo::Geometry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ValidityError, ValidityErrorKind};
use crate::geometry;
use crate::kernel::guarded;

pub(crate) use repair::zero_buffer;

/// Tolerances for validity checks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyCfg {
    /// Envelope padding when pairing segments.
    pub eps: f64,
}

impl Default for TopologyCfg {
    fn default() -> Self {
        Self { eps: 1e-12 }
    }
}

/// First defect of `g`, or `None` when valid.
#[inline]
pub fn diagnose(g: &Geometry<f64>) -> Option<ValidityError> {
    diagnose_with(g, &TopologyCfg::default())
}

/// A panic inside the checker is reported as `Other`.
pub fn diagnose_with(g: &Geometry<f64>, cfg: &TopologyCfg) -> Option<ValidityError> {
    match guarded("validity check", || validity::check(g, cfg)) {
        Ok(checked) => checked.err(),
        Err(e) => Some(ValidityError::new(ValidityErrorKind::Other, None, e.to_string())),
    }
}

#[inline]
pub fn is_valid(g: &Geometry<f64>) -> bool {
    diagnose(g).is_none()
}

/// Repair `g` for the defect `error`; the result is re-checked.
pub fn repair(g: &Geometry<f64>, error: &ValidityError) -> Result<Geometry<f64>> {
    repair::repair_with(g, error, &TopologyCfg::default())
}

/// Diagnose and repair; keeps `g` when it is valid or the repair fails.
pub fn fix_geometry(g: &Geometry<f64>) -> Geometry<f64> {
    let Some(error) = diagnose(g) else {
        return g.clone();
    };
    match repair(g, &error) {
        Ok(fixed) => fixed,
        Err(e) => {
            warn!(error = %e, "keeping invalid geometry");
            g.clone()
        }
    }
}

/// Collapse homogeneous collections to multi-shapes; zero-buffer mixed ones.
///
/// The mixed case is lossy: line and point parts are dropped.
pub fn normalize(g: &Geometry<f64>) -> Geometry<f64> {
    let Geometry::GeometryCollection(_) = g else {
        return g.clone();
    };
    if let Some(collapsed) = geometry::collapse_homogeneous(g) {
        return collapsed;
    }
    debug!("normalize: mixed collection, falling back to zero buffer");
    match zero_buffer(g) {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "normalize: zero buffer failed, keeping collection");
            g.clone()
        }
    }
}

/// `normalize` followed by `fix_geometry`.
pub fn prepare(g: &Geometry<f64>) -> Geometry<f64> {
    fix_geometry(&normalize(g))
}
