//! Spherical Web Mercator (EPSG:3857).
//!
//! Only for non-metric work: distances grow by 1/cos(φ) away from the equator.

use geo::{coord, Coord, Rect};

use super::PlanarFrame;
use crate::error::{GeoError, Result};

/// Latitude limit at which the square world map closes.
pub const MAX_LAT_DEG: f64 = 85.051_128_78;

const R: f64 = super::tmerc::WGS84_A;

#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Envelope of a geographic rectangle in Web Mercator meters.
    pub fn forward_rect(&self, rect: Rect<f64>) -> Result<Rect<f64>> {
        let min = self.forward_coord(rect.min())?;
        let max = self.forward_coord(rect.max())?;
        Ok(Rect::new(min, max))
    }

    pub fn inverse_rect(&self, rect: Rect<f64>) -> Result<Rect<f64>> {
        let min = self.inverse_coord(rect.min())?;
        let max = self.inverse_coord(rect.max())?;
        Ok(Rect::new(min, max))
    }
}

impl PlanarFrame for WebMercator {
    fn forward_coord(&self, c: Coord<f64>) -> Result<Coord<f64>> {
        if !c.x.is_finite() || !c.y.is_finite() {
            return Err(GeoError::projection("non-finite coordinate"));
        }
        let lat = c.y.clamp(-MAX_LAT_DEG, MAX_LAT_DEG).to_radians();
        let x = R * c.x.to_radians();
        let y = R * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
        Ok(coord! { x: x, y: y })
    }

    fn inverse_coord(&self, c: Coord<f64>) -> Result<Coord<f64>> {
        if !c.x.is_finite() || !c.y.is_finite() {
            return Err(GeoError::projection("non-finite coordinate"));
        }
        let lon = (c.x / R).to_degrees();
        let lat = (2.0 * (c.y / R).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
        Ok(coord! { x: lon, y: lat })
    }
}
