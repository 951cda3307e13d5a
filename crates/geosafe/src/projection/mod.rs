//! Coordinate frames for metric work on geographic input.
//!
//! Purpose
//! - Resolve a locally accurate planar frame (meters) around an anchor and
//!   transform geometries or single coordinates into and out of it.
//! - Provide a fixed global frame (Web Mercator) for non-metric tasks such as
//!   cheap simplification; never for length or area.
//!
//! Model
//! - `LocalProjection` is a Transverse Mercator frame with its central meridian
//!   and origin at the anchor. It is a function-local value: build one per
//!   operation call, anchored at the geometry being processed.
//! - All transforms return `GeoError::Projection` on failure; metric callers
//!   recover and degrade.

mod mercator;
mod tmerc;

pub use mercator::{WebMercator, MAX_LAT_DEG};
pub use tmerc::{TransverseMercator, MAX_LON_OFFSET_DEG, WGS84_A, WGS84_F};

use geo::{BoundingRect, Centroid, Coord, Geometry, MapCoords};

use crate::error::{GeoError, Result};

/// A planar frame with forward (geographic → planar) and inverse transforms.
pub trait PlanarFrame: Send + Sync {
    fn forward_coord(&self, c: Coord<f64>) -> Result<Coord<f64>>;

    fn inverse_coord(&self, c: Coord<f64>) -> Result<Coord<f64>>;

    /// Transform every coordinate of `g` into the frame.
    fn forward<G>(&self, g: &G) -> Result<G::Output>
    where
        Self: Sized,
        G: MapCoords<f64, f64>,
    {
        g.try_map_coords(|c| self.forward_coord(c))
    }

    /// Transform every coordinate of `g` back to the geographic frame.
    fn inverse<G>(&self, g: &G) -> Result<G::Output>
    where
        Self: Sized,
        G: MapCoords<f64, f64>,
    {
        g.try_map_coords(|c| self.inverse_coord(c))
    }
}

/// Local metric frame anchored at a geographic coordinate.
#[derive(Clone, Copy, Debug)]
pub struct LocalProjection {
    anchor: Coord<f64>,
    tm: TransverseMercator,
}

impl LocalProjection {
    /// Frame centred on `anchor` (x = longitude, y = latitude).
    pub fn at(anchor: Coord<f64>) -> Result<Self> {
        let tm = TransverseMercator::new(anchor.x, anchor.y)?;
        Ok(Self { anchor, tm })
    }

    #[inline]
    pub fn for_coord(c: Coord<f64>) -> Result<Self> {
        Self::at(c)
    }

    /// Frame anchored at the centroid of `g`, or at its envelope centre when
    /// the centroid is undefined.
    pub fn for_geometry(g: &Geometry<f64>) -> Result<Self> {
        let anchor = g
            .centroid()
            .map(|p| p.0)
            .filter(|c| c.x.is_finite() && c.y.is_finite())
            .or_else(|| g.bounding_rect().map(|r| r.center()))
            .ok_or_else(|| GeoError::projection("cannot anchor a frame on an empty geometry"))?;
        Self::at(anchor)
    }

    #[inline]
    pub fn anchor(&self) -> Coord<f64> {
        self.anchor
    }
}

impl PlanarFrame for LocalProjection {
    #[inline]
    fn forward_coord(&self, c: Coord<f64>) -> Result<Coord<f64>> {
        let (x, y) = self.tm.forward(c.x, c.y)?;
        Ok(Coord { x, y })
    }

    #[inline]
    fn inverse_coord(&self, c: Coord<f64>) -> Result<Coord<f64>> {
        let (x, y) = self.tm.inverse(c.x, c.y)?;
        Ok(Coord { x, y })
    }
}
