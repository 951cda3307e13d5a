//! Error taxonomy shared by all modules.
//!
//! Propagation policy
//! - `Projection` and `TopologyOperation` are recovered inside the metric and
//!   safe boolean layers; public fail-soft entry points never return them.
//! - `Argument` is the only variant surfaced to callers of those entry points.
//! - `RepairFailed` is handed to the immediate caller of `topology::repair`,
//!   which picks the fallback.

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Classes of topology defects reported by `topology::diagnose`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidityErrorKind {
    /// Two segments of the geometry cross or overlap.
    SelfIntersection,
    /// A ring touches itself at a single point.
    RingSelfIntersection,
    /// A hole is not fully inside its shell.
    HoleOutsideShell,
    /// Anything else (too few points, non-finite coordinates, nested holes).
    Other,
}

/// Typed topology defect with the location where it was detected.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind:?}: {message}{}", fmt_location(.location))]
pub struct ValidityError {
    pub kind: ValidityErrorKind,
    pub location: Option<Coord<f64>>,
    pub message: String,
}

fn fmt_location(location: &Option<Coord<f64>>) -> String {
    match location {
        Some(c) => format!(" at ({}, {})", c.x, c.y),
        None => String::new(),
    }
}

impl ValidityError {
    pub fn new(
        kind: ValidityErrorKind,
        location: Option<Coord<f64>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Frame resolution or coordinate transform failed.
    #[error("projection error: {0}")]
    Projection(String),

    /// Input geometry carries a topology defect.
    #[error("invalid geometry: {0}")]
    Validity(#[from] ValidityError),

    /// Repair heuristic could not produce a valid geometry.
    #[error("repair failed: {0}")]
    RepairFailed(String),

    /// Kernel predicate or operation failed while executing.
    #[error("topology operation failed: {0}")]
    TopologyOperation(String),

    /// Precondition violation by the caller.
    #[error("invalid argument: {0}")]
    Argument(String),
}

impl GeoError {
    pub fn projection(msg: impl Into<String>) -> Self {
        GeoError::Projection(msg.into())
    }

    pub fn repair_failed(msg: impl Into<String>) -> Self {
        GeoError::RepairFailed(msg.into())
    }

    pub fn topology_operation(msg: impl Into<String>) -> Self {
        GeoError::TopologyOperation(msg.into())
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        GeoError::Argument(msg.into())
    }

    /// True for the errors the fail-soft layers are expected to swallow.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, GeoError::Argument(_))
    }
}
