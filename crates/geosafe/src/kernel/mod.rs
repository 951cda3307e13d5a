//! Planar kernel seam.
//!
//! Purpose
//! - Funnel every call into the planar geometry kernel through one place so
//!   that kernel failures (panics on degenerate input, non-finite output)
//!   surface as `GeoError::TopologyOperation` values instead of unwinding.
//! - Polygon set algebra runs on `i_overlay` with the non-zero fill rule;
//!   predicates, line clipping and measurements come from `geo`.

pub(crate) mod overlay;

use std::panic::{self, AssertUnwindSafe};

use crate::error::{GeoError, Result};

/// Run a kernel call, converting a panic into a `TopologyOperation` error.
pub(crate) fn guarded<T>(op: &'static str, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "kernel panicked".to_string());
        GeoError::topology_operation(format!("{op}: {msg}"))
    })
}
