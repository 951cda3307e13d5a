//! Lloyd relaxation: near-uniform point sets inside a polygonal area.
//!
//! Purpose
//! - Fill an area with points at roughly a given spacing (typically within
//!   10% of it). The result is not a lattice.
//!
//! Model
//! - Init: `ceil(area / spacing²)` points seeded uniformly inside the area.
//! - Iterate: Voronoi cell of every point (Delaunay neighbours, bisector
//!   half-planes inside the padded area envelope), clipped to the area; each
//!   point moves to its clipped cell's centroid. A cell that cannot be
//!   clipped keeps its point. The point count never changes.
//! - Done: after `RelaxCfg::max_iterations` steps. There is no convergence
//!   test.
//!
//! Frames
//! - `RelaxationState` and `generate_lloyd_points` work in a local planar
//!   frame (meters). `generate_lloyd_points_geographic` wraps them for
//!   lon/lat input.

mod cells;
mod seed;
mod voronoi;

pub use seed::SeedToken;

use geo::{Area, BoundingRect, Centroid, Coord, Geometry, MultiPolygon, Rect};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{GeoError, Result};
use crate::geometry::{self, Components};
use crate::kernel::overlay::{self, SetOp};
use crate::projection::{LocalProjection, PlanarFrame};

/// Iteration and seeding limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxCfg {
    pub max_iterations: usize,
    /// Rejected draws allowed per requested point while seeding.
    pub max_seed_attempts_per_point: usize,
}

impl Default for RelaxCfg {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_seed_attempts_per_point: 1000,
        }
    }
}

/// Phase of a relaxation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelaxPhase {
    Seeded,
    Iterating(usize),
    Done,
}

/// Point count for `area` at `spacing`; ignores float noise just above an
/// integer ratio.
fn point_count(area: f64, spacing: f64) -> usize {
    let ratio = area / (spacing * spacing);
    (ratio - 1e-6 * ratio.max(1.0)).ceil().max(0.0) as usize
}

fn padded(r: Rect<f64>, pad: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: r.min().x - pad,
            y: r.min().y - pad,
        },
        Coord {
            x: r.max().x + pad,
            y: r.max().y + pad,
        },
    )
}

/// Lloyd iteration state over a local-frame area.
#[derive(Clone, Debug)]
pub struct RelaxationState {
    area: MultiPolygon<f64>,
    envelope: Rect<f64>,
    points: Vec<Coord<f64>>,
    iteration: usize,
    cfg: RelaxCfg,
}

impl RelaxationState {
    /// Validate inputs and seed the initial points.
    ///
    /// Errors: `Argument` for a non-positive or non-finite spacing, a
    /// non-empty area without positive polygonal area, or exhausted seeding.
    /// An empty area yields a state with no points.
    pub fn init<R: Rng + ?Sized>(
        area: &Geometry<f64>,
        spacing: f64,
        cfg: RelaxCfg,
        rng: &mut R,
    ) -> Result<Self> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(GeoError::argument(format!("spacing must be positive, got {spacing}")));
        }
        let polygons = Components::of(area).polygons;
        let Some(bounds) = polygons.bounding_rect() else {
            if geometry::is_empty(area) {
                return Ok(Self {
                    area: polygons,
                    envelope: Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }),
                    points: Vec::new(),
                    iteration: 0,
                    cfg,
                });
            }
            return Err(GeoError::argument("area has no polygonal content"));
        };
        let size = polygons.unsigned_area();
        if !(size > 0.0) {
            return Err(GeoError::argument(format!("area must be positive, got {size}")));
        }
        let count = point_count(size, spacing);
        let attempts = cfg.max_seed_attempts_per_point;
        let points = seed::sample_inside(&polygons, &bounds, count, attempts, rng)?;
        debug!(count, area = size, spacing, "lloyd seeded");
        let pad = spacing.max(bounds.width().max(bounds.height()) * 0.01);
        Ok(Self {
            area: polygons,
            envelope: padded(bounds, pad),
            points,
            iteration: 0,
            cfg,
        })
    }

    #[inline]
    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn phase(&self) -> RelaxPhase {
        if self.is_done() {
            RelaxPhase::Done
        } else if self.iteration == 0 {
            RelaxPhase::Seeded
        } else {
            RelaxPhase::Iterating(self.iteration)
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.iteration >= self.cfg.max_iterations || self.points.is_empty()
    }

    fn clipped_centroid(&self, cell: geo::Polygon<f64>) -> Option<Coord<f64>> {
        let cell = MultiPolygon::new(vec![cell]);
        match overlay::polygon_overlay(&cell, &self.area, SetOp::Intersection) {
            Ok(clipped) => clipped.centroid().map(|p| p.0),
            Err(e) => {
                debug!(error = %e, "cell clip failed, keeping site");
                None
            }
        }
    }

    /// One Lloyd step. No-op once done.
    pub fn step(&mut self) {
        if self.is_done() {
            return;
        }
        let neighbours = voronoi::neighbours(&self.points);
        let next: Vec<Coord<f64>> = self
            .points
            .iter()
            .zip(&neighbours)
            .map(|(site, nb)| {
                cells::voronoi_cell(*site, nb, &self.envelope)
                    .and_then(|cell| self.clipped_centroid(cell))
                    .unwrap_or(*site)
            })
            .collect();
        let moved = self
            .points
            .iter()
            .zip(&next)
            .map(|(a, b)| (a.x - b.x).hypot(a.y - b.y))
            .fold(0.0, f64::max);
        self.points = next;
        self.iteration += 1;
        trace!(iteration = self.iteration, max_move = moved, "lloyd step");
    }

    /// Iterate to the cap and return the points.
    pub fn run(mut self) -> Vec<Coord<f64>> {
        while !self.is_done() {
            self.step();
        }
        self.points
    }
}

/// Lloyd points inside a local-frame area.
pub fn generate_lloyd_points<R: Rng + ?Sized>(
    area: &Geometry<f64>,
    spacing: f64,
    rng: &mut R,
) -> Result<Vec<Coord<f64>>> {
    generate_lloyd_points_with(area, spacing, RelaxCfg::default(), rng)
}

pub fn generate_lloyd_points_with<R: Rng + ?Sized>(
    area: &Geometry<f64>,
    spacing: f64,
    cfg: RelaxCfg,
    rng: &mut R,
) -> Result<Vec<Coord<f64>>> {
    Ok(RelaxationState::init(area, spacing, cfg, rng)?.run())
}

/// Lloyd points for a lon/lat area with `meters` spacing, returned as lon/lat.
pub fn generate_lloyd_points_geographic<R: Rng + ?Sized>(
    area: &Geometry<f64>,
    meters: f64,
    rng: &mut R,
) -> Result<Vec<Coord<f64>>> {
    generate_lloyd_points_geographic_with(area, meters, RelaxCfg::default(), rng)
}

pub fn generate_lloyd_points_geographic_with<R: Rng + ?Sized>(
    area: &Geometry<f64>,
    meters: f64,
    cfg: RelaxCfg,
    rng: &mut R,
) -> Result<Vec<Coord<f64>>> {
    if !(meters.is_finite() && meters > 0.0) {
        return Err(GeoError::argument(format!("spacing must be positive, got {meters}")));
    }
    if geometry::is_empty(area) {
        return Ok(Vec::new());
    }
    let frame = LocalProjection::for_geometry(area)?;
    let local = frame.forward(area)?;
    generate_lloyd_points_with(&local, meters, cfg, rng)?
        .into_iter()
        .map(|c| frame.inverse_coord(c))
        .collect()
}
