//! Fail-soft boolean predicates and set operations.
//!
//! Purpose
//! - Run kernel predicates and set algebra on geometries of unknown quality
//!   without ever surfacing a kernel failure.
//!
//! Model
//! - Operand A is normalized, repaired and indexed once (`PreparedOperand`);
//!   the prepared form is immutable and may be shared across threads for
//!   one-against-many queries.
//! - Operand B is normalized and repaired per query.
//! - Attempt policy: exact kernel call; on failure, one retry with A buffered
//!   by `SafeOpsCfg::perturbation_meters`; on a second failure, predicates
//!   are `false` and operations return the empty geometry.
//! - `difference` walks parts: every part of B is subtracted from every part
//!   of A in turn, and the non-empty remainders are recombined.

use geo::{BoundingRect, Geometry, Rect};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry;
use crate::kernel::overlay;
use crate::metric::{self, BufferStyle};
use crate::topology;

/// Retry tuning for the safe operations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeOpsCfg {
    /// Buffer distance applied to operand A before the retry.
    pub perturbation_meters: f64,
}

impl Default for SafeOpsCfg {
    fn default() -> Self {
        Self {
            perturbation_meters: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
struct PartEnvelope {
    idx: usize,
    bounds: AABB<[f64; 2]>,
}

impl RTreeObject for PartEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

fn aabb(r: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y])
}

fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

fn rect_within(inner: &Rect<f64>, outer: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}

/// Repaired, part-indexed operand for repeated queries.
#[derive(Debug)]
pub struct PreparedOperand {
    geometry: Geometry<f64>,
    parts: Vec<Geometry<f64>>,
    bounds: Option<Rect<f64>>,
    index: RTree<PartEnvelope>,
    cfg: SafeOpsCfg,
}

impl PreparedOperand {
    pub fn new(g: &Geometry<f64>) -> Self {
        Self::with_cfg(g, SafeOpsCfg::default())
    }

    pub fn with_cfg(g: &Geometry<f64>, cfg: SafeOpsCfg) -> Self {
        let geometry = topology::prepare(g);
        let parts = geometry::parts(&geometry);
        let entries = parts
            .iter()
            .enumerate()
            .filter_map(|(idx, part)| {
                part.bounding_rect().map(|r| PartEnvelope {
                    idx,
                    bounds: aabb(r),
                })
            })
            .collect();
        Self {
            bounds: geometry.bounding_rect(),
            index: RTree::bulk_load(entries),
            geometry,
            parts,
            cfg,
        }
    }

    /// The repaired geometry.
    #[inline]
    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        geometry::is_empty(&self.geometry)
    }

    #[inline]
    pub fn cfg(&self) -> &SafeOpsCfg {
        &self.cfg
    }

    /// Parts of A whose envelope meets `r`.
    fn parts_near(&self, r: Rect<f64>) -> impl Iterator<Item = &Geometry<f64>> + '_ {
        self.index
            .locate_in_envelope_intersecting(&aabb(r))
            .map(move |e| &self.parts[e.idx])
    }

    fn retry<T>(
        &self,
        op: &'static str,
        first: Result<T>,
        again: impl FnOnce(&Geometry<f64>) -> Result<T>,
        soft: T,
    ) -> T {
        with_retry(op, first, &self.geometry, &self.cfg, again, soft)
    }

    pub fn intersects(&self, b: &Geometry<f64>) -> bool {
        let b = topology::prepare(b);
        let (Some(_), Some(rb)) = (self.bounds, b.bounding_rect()) else {
            return false;
        };
        let exact = (|| -> Result<bool> {
            for part in self.parts_near(rb) {
                if overlay::intersects(part, &b)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })();
        self.retry("intersects", exact, |a| overlay::intersects(a, &b), false)
    }

    /// No point of `b` lies outside A.
    pub fn covers(&self, b: &Geometry<f64>) -> bool {
        let b = topology::prepare(b);
        let (Some(ra), Some(rb)) = (self.bounds, b.bounding_rect()) else {
            return false;
        };
        if !rect_within(&rb, &ra) {
            return false;
        }
        let exact = overlay::covers(&self.geometry, &b);
        self.retry("covers", exact, |a| overlay::covers(a, &b), false)
    }

    pub fn contains(&self, b: &Geometry<f64>) -> bool {
        let b = topology::prepare(b);
        let (Some(ra), Some(rb)) = (self.bounds, b.bounding_rect()) else {
            return false;
        };
        if !rect_within(&rb, &ra) {
            return false;
        }
        let exact = overlay::contains(&self.geometry, &b);
        self.retry("contains", exact, |a| overlay::contains(a, &b), false)
    }

    pub fn intersection(&self, b: &Geometry<f64>) -> Geometry<f64> {
        let b = topology::prepare(b);
        let (Some(ra), Some(rb)) = (self.bounds, b.bounding_rect()) else {
            return geometry::empty();
        };
        if !rects_overlap(&ra, &rb) {
            return geometry::empty();
        }
        let exact = overlay::intersection(&self.geometry, &b);
        self.retry("intersection", exact, |a| overlay::intersection(a, &b), geometry::empty())
    }

    pub fn union(&self, b: &Geometry<f64>) -> Geometry<f64> {
        let b = topology::prepare(b);
        if geometry::is_empty(&b) {
            return self.geometry.clone();
        }
        if self.is_empty() {
            return b;
        }
        let exact = overlay::union(&self.geometry, &b);
        self.retry("union", exact, |a| overlay::union(a, &b), geometry::empty())
    }

    pub fn difference(&self, b: &Geometry<f64>) -> Geometry<f64> {
        let b = topology::prepare(b);
        if self.is_empty() {
            return geometry::empty();
        }
        let (Some(ra), Some(rb)) = (self.bounds, b.bounding_rect()) else {
            return self.geometry.clone();
        };
        if !rects_overlap(&ra, &rb) {
            return self.geometry.clone();
        }
        let exact = if geometry::is_multi_part(&self.geometry) || geometry::is_multi_part(&b) {
            difference_by_parts(&self.parts, &b)
        } else {
            overlay::difference(&self.geometry, &b)
        };
        self.retry(
            "difference",
            exact,
            |a| difference_by_parts(&geometry::parts(a), &b),
            geometry::empty(),
        )
    }
}

/// Subtract every part of `b` from every part of `a`, then recombine.
fn difference_by_parts(a_parts: &[Geometry<f64>], b: &Geometry<f64>) -> Result<Geometry<f64>> {
    let cuts: Vec<(Geometry<f64>, Option<Rect<f64>>)> = geometry::parts(b)
        .into_iter()
        .map(|cut| {
            let r = cut.bounding_rect();
            (cut, r)
        })
        .collect();
    let mut kept = Vec::with_capacity(a_parts.len());
    for part in a_parts {
        let mut rest = part.clone();
        for (cut, cut_rect) in &cuts {
            if geometry::is_empty(&rest) {
                break;
            }
            let (Some(r), Some(c)) = (rest.bounding_rect(), cut_rect) else {
                continue;
            };
            if !rects_overlap(&r, c) {
                continue;
            }
            rest = overlay::difference(&rest, cut)?;
        }
        if !geometry::is_empty(&rest) {
            kept.push(rest);
        }
    }
    Ok(geometry::recombine(kept))
}

/// Two-attempt policy shared by every safe operation.
fn with_retry<T>(
    op: &'static str,
    first: Result<T>,
    a: &Geometry<f64>,
    cfg: &SafeOpsCfg,
    again: impl FnOnce(&Geometry<f64>) -> Result<T>,
    soft: T,
) -> T {
    let err = match first {
        Ok(v) => return v,
        Err(e) => e,
    };
    debug!(op, error = %err, meters = cfg.perturbation_meters, "retrying with perturbed operand");
    let perturbed = metric::buffer(a, cfg.perturbation_meters, &BufferStyle::default());
    match again(&perturbed) {
        Ok(v) => v,
        Err(e) => {
            warn!(op, error = %e, "safe operation failed twice, returning soft result");
            soft
        }
    }
}

pub fn safe_intersects(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    PreparedOperand::new(a).intersects(b)
}

pub fn safe_covers(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    PreparedOperand::new(a).covers(b)
}

pub fn safe_contains(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    PreparedOperand::new(a).contains(b)
}

pub fn safe_intersection(a: &Geometry<f64>, b: &Geometry<f64>) -> Geometry<f64> {
    PreparedOperand::new(a).intersection(b)
}

pub fn safe_union(a: &Geometry<f64>, b: &Geometry<f64>) -> Geometry<f64> {
    PreparedOperand::new(a).union(b)
}

pub fn safe_difference(a: &Geometry<f64>, b: &Geometry<f64>) -> Geometry<f64> {
    PreparedOperand::new(a).difference(b)
}

/// Union of all inputs, folded pairwise.
pub fn safe_union_all<'a>(
    geometries: impl IntoIterator<Item = &'a Geometry<f64>>,
) -> Geometry<f64> {
    geometries
        .into_iter()
        .fold(geometry::empty(), |acc, g| PreparedOperand::new(&acc).union(g))
}

#[cfg(test)]
mod tests;
