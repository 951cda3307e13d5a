//! Ellipsoidal Transverse Mercator on WGS84 (Krüger series, third order).
//!
//! Model
//! - Conformal latitude via `t = sinh(atanh(sin φ) − e·atanh(e·sin φ))`, then
//!   the Gauss–Schreiber sphere, then the α/β series to the ellipsoid.
//! - Scale factor 1 on the central meridian; the origin latitude is subtracted
//!   from northings so the anchor maps to (0, 0).
//!
//! References
//! - Karney, "Transverse Mercator with an accuracy of a few nanometers" (2011), eqs. 7–36.

use crate::error::{GeoError, Result};

/// WGS84 semi-major axis (m).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Widest longitude offset from the central meridian accepted by the series.
pub const MAX_LON_OFFSET_DEG: f64 = 60.0;

#[derive(Clone, Copy, Debug)]
pub struct TransverseMercator {
    lon0: f64,
    y0: f64,
    rect_a: f64,
    e: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl TransverseMercator {
    /// Frame whose central meridian and origin latitude sit at `(lon0_deg, lat0_deg)`.
    pub fn new(lon0_deg: f64, lat0_deg: f64) -> Result<Self> {
        if !lon0_deg.is_finite() || !lat0_deg.is_finite() || lat0_deg.abs() > 90.0 {
            return Err(GeoError::projection(format!(
                "invalid anchor ({lon0_deg}, {lat0_deg})"
            )));
        }
        let f = WGS84_F;
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;
        let rect_a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        let mut tm = Self {
            lon0: lon0_deg,
            y0: 0.0,
            rect_a,
            e: (f * (2.0 - f)).sqrt(),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        };
        let (_, y0) = tm.forward(lon0_deg, lat0_deg)?;
        tm.y0 = y0;
        Ok(tm)
    }

    #[inline]
    pub fn central_meridian(&self) -> f64 {
        self.lon0
    }

    /// Degrees in, meters out.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return Err(GeoError::projection("non-finite coordinate"));
        }
        if lat_deg.abs() > 90.0 {
            return Err(GeoError::projection(format!("latitude {lat_deg} out of range")));
        }
        let dlon = wrap_lon(lon_deg - self.lon0);
        if dlon.abs() > MAX_LON_OFFSET_DEG {
            return Err(GeoError::projection(format!(
                "longitude {lon_deg} is {dlon:.1}° from the central meridian"
            )));
        }
        let phi = lat_deg.to_radians();
        let lam = dlon.to_radians();
        let s = phi.sin();
        let t = (s.atanh() - self.e * (self.e * s).atanh()).sinh();
        let xi_p = t.atan2(lam.cos());
        let eta_p = (lam.sin() / (1.0 + t * t).sqrt()).atanh();
        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }
        let x = self.rect_a * eta;
        let y = self.rect_a * xi - self.y0;
        if !x.is_finite() || !y.is_finite() {
            return Err(GeoError::projection("forward transform diverged"));
        }
        Ok((x, y))
    }

    /// Meters in, degrees out.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeoError::projection("non-finite coordinate"));
        }
        let xi = (y + self.y0) / self.rect_a;
        let eta = x / self.rect_a;
        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }
        let chi = (xi_p.sin() / eta_p.cosh()).clamp(-1.0, 1.0).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            phi += d * (k * chi).sin();
        }
        let lam = eta_p.sinh().atan2(xi_p.cos());
        let lon = wrap_lon(self.lon0 + lam.to_degrees());
        let lat = phi.to_degrees();
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GeoError::projection("inverse transform diverged"));
        }
        Ok((lon, lat))
    }
}

/// Longitude folded into [-180, 180).
#[inline]
pub(crate) fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
