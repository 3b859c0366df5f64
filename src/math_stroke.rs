//! Stroke math: cap, join and miter geometry for offset outlines.
//!
//! `MathStroke` appends the vertices of one join or one cap to a [`Path`]
//! whose current point is already on the incoming offset rail. Joins take
//! the unit tangents on either side of the corner and a signed offset along
//! the left normal, so the same code serves both rails of a stroke and the
//! single rail of an offset contour. Round geometry is emitted as conic
//! arcs rather than polylines.

use crate::path_storage::Path;
use crate::point::{Point, Vector};

/// A join whose round arc would bulge less than this many device units
/// past its bevel is treated as flat and skipped.
pub const FLAT_JOIN_EPSILON: f64 = 1.0 / 1024.0;

// ============================================================================
// Enums
// ============================================================================

/// Line cap style for open path ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineCap {
    #[default]
    Butt,
    Square,
    Round,
}

/// Line join style on the outer side of a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineJoin {
    /// Sharp corner; bevel when the miter would exceed the limit.
    #[default]
    Miter,
    /// Sharp corner truncated at the miter limit.
    MiterClip,
    Round,
    Bevel,
}

/// Join style on the inner side of a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InnerJoin {
    /// Step back to the centerline point between the two rails.
    #[default]
    Retract,
    /// Meet at the intersection of the rails when it lies within both
    /// neighboring segments, retract otherwise.
    Jag,
}

// ============================================================================
// MathStroke
// ============================================================================

/// Join and cap geometry calculator.
#[derive(Debug, Clone, Copy)]
pub struct MathStroke {
    width: f64,
    miter_limit: f64,
    approx_scale: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    inner_join: InnerJoin,
}

impl MathStroke {
    pub fn new() -> Self {
        Self {
            width: 0.5,
            miter_limit: 4.0,
            approx_scale: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            inner_join: InnerJoin::Retract,
        }
    }

    pub fn set_line_cap(&mut self, lc: LineCap) {
        self.line_cap = lc;
    }
    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn set_line_join(&mut self, lj: LineJoin) {
        self.line_join = lj;
    }
    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    pub fn set_inner_join(&mut self, ij: InnerJoin) {
        self.inner_join = ij;
    }
    pub fn inner_join(&self) -> InnerJoin {
        self.inner_join
    }

    /// Full stroke width. Negative widths are clamped to zero.
    pub fn set_width(&mut self, w: f64) {
        self.width = w.max(0.0) * 0.5;
    }
    pub fn width(&self) -> f64 {
        self.width * 2.0
    }

    /// Half the stroke width: the offset of each rail.
    pub fn half_width(&self) -> f64 {
        self.width
    }

    /// Maximum ratio of miter length to offset. Clamped to at least 1.
    pub fn set_miter_limit(&mut self, ml: f64) {
        self.miter_limit = if ml.is_nan() { 1.0 } else { ml.max(1.0) };
    }
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    /// Set the miter limit from the smallest corner angle that still
    /// gets a sharp miter.
    pub fn set_miter_limit_theta(&mut self, t: f64) {
        self.set_miter_limit(1.0 / (t * 0.5).sin());
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approx_scale = s;
    }
    pub fn approximation_scale(&self) -> f64 {
        self.approx_scale
    }

    /// Whether the turn from `t1` to `t2` is too slight to need a join on
    /// a rail `offset` away from the centerline.
    pub fn is_flat_join(&self, t1: Vector, t2: Vector, offset: f64) -> bool {
        let dot = t1.dot(t2);
        if dot <= 0.0 {
            return false;
        }
        let cos_half = ((1.0 + dot.min(1.0)) * 0.5).sqrt();
        self.approx_scale * offset.abs() * (1.0 - cos_half) < FLAT_JOIN_EPSILON
    }

    // ---------------------------------------------------------------
    // Caps
    // ---------------------------------------------------------------

    /// Cap at `end`, where `dir` is the unit direction leaving the path.
    /// The current point of `out` is `end` offset to the left of `dir`;
    /// the cap finishes on the right.
    pub fn calc_cap(&self, out: &mut Path, end: Point, dir: Vector) {
        let n = dir.normal();
        let w = self.width;
        match self.line_cap {
            LineCap::Butt => {
                let p = end - n * w;
                out.line_to(p.x, p.y);
            }
            LineCap::Square => {
                let e = dir * w;
                let p1 = end + n * w + e;
                let p2 = end - n * w + e;
                let p3 = end - n * w;
                out.line_to(p1.x, p1.y);
                out.line_to(p2.x, p2.y);
                out.line_to(p3.x, p3.y);
            }
            LineCap::Round => {
                conic_arc(out, end, n, dir, w);
                conic_arc(out, end, dir, -n, w);
            }
        }
    }

    /// Mark for a subpath that has no length. Butt caps draw nothing.
    pub fn calc_dot(&self, out: &mut Path, center: Point) {
        let w = self.width;
        if w <= 0.0 {
            return;
        }
        match self.line_cap {
            LineCap::Butt => {}
            LineCap::Square => out.rect(center.x - w, center.y - w, 2.0 * w, 2.0 * w),
            LineCap::Round => out.circle(center.x, center.y, w),
        }
    }

    // ---------------------------------------------------------------
    // Joins
    // ---------------------------------------------------------------

    /// Join at corner `v` between the incoming tangent `t1` and the
    /// outgoing tangent `t2` (both unit). `len1` and `len2` are the lengths
    /// of the neighboring segments, `offset` the signed distance of the rail
    /// along the left normal. The current point of `out` is
    /// `v + t1.normal() * offset`; the join ends at `v + t2.normal() * offset`
    /// unless it is flat, in which case nothing is emitted.
    #[allow(clippy::too_many_arguments)]
    pub fn calc_join(
        &self,
        out: &mut Path,
        v: Point,
        t1: Vector,
        t2: Vector,
        len1: f64,
        len2: f64,
        offset: f64,
    ) {
        if offset == 0.0 {
            return;
        }
        if self.is_flat_join(t1, t2, offset) {
            log::trace!("stroke: flat join at ({}, {}) skipped", v.x, v.y);
            return;
        }

        let n1 = t1.normal();
        let n2 = t2.normal();
        let a = v + n1 * offset;
        let b = v + n2 * offset;

        if t1.cross(t2) * offset > 0.0 {
            // inner
            if self.inner_join == InnerJoin::Jag {
                let gap = a.distance_squared(b);
                if gap < len1 * len1 && gap < len2 * len2 {
                    if let Some(i) = miter_point(v, n1, n2, offset) {
                        out.line_to(i.x, i.y);
                        out.line_to(b.x, b.y);
                        return;
                    }
                }
            }
            out.line_to(v.x, v.y);
            out.line_to(b.x, b.y);
            return;
        }

        match self.line_join {
            LineJoin::Bevel => out.line_to(b.x, b.y),
            LineJoin::Miter | LineJoin::MiterClip => self.calc_miter(out, v, t1, n1, n2, offset),
            LineJoin::Round => {
                let s = offset.signum();
                let u1 = n1 * s;
                let u2 = n2 * s;
                let r = offset.abs();
                if u1.dot(u2) >= 0.0 {
                    conic_arc(out, v, u1, u2, r);
                } else {
                    let mid = (u1 + u2).try_unit().unwrap_or(t1);
                    conic_arc(out, v, u1, mid, r);
                    conic_arc(out, v, mid, u2, r);
                }
            }
        }
    }

    fn calc_miter(&self, out: &mut Path, v: Point, t1: Vector, n1: Vector, n2: Vector, offset: f64) {
        let a = v + n1 * offset;
        let b = v + n2 * offset;
        let r = offset.abs();
        let lim = self.miter_limit * r;

        let m = miter_point(v, n1, n2, offset);
        if let Some(m) = m {
            if m.distance(v) <= lim {
                out.line_to(m.x, m.y);
                out.line_to(b.x, b.y);
                return;
            }
        }

        if self.line_join == LineJoin::MiterClip {
            let (p1, p2) = match m {
                Some(m) => {
                    let di = m.distance(v);
                    let dbevel = v.distance(a.midpoint(b));
                    let k = (lim - dbevel) / (di - dbevel);
                    (a + (m - a) * k, b + (m - b) * k)
                }
                // the rails turn back on themselves; clip square to the limit
                None => (a + t1 * lim, b + t1 * lim),
            };
            out.line_to(p1.x, p1.y);
            out.line_to(p2.x, p2.y);
        }
        out.line_to(b.x, b.y);
    }
}

impl Default for MathStroke {
    fn default() -> Self {
        Self::new()
    }
}

/// Intersection of the two offset rails around `v`, `None` when they are
/// parallel and turn back on each other.
fn miter_point(v: Point, n1: Vector, n2: Vector, offset: f64) -> Option<Point> {
    let sum = n1 + n2;
    let len2 = sum.length_squared();
    if len2 < 1e-12 {
        return None;
    }
    Some(v + sum * (2.0 * offset / len2))
}

/// Conic arc of radius `r` around `center` from direction `u1` to `u2`
/// (unit vectors at most a quarter turn apart).
fn conic_arc(out: &mut Path, center: Point, u1: Vector, u2: Vector, r: f64) {
    let sum = u1 + u2;
    let cos_half = sum.length() * 0.5;
    let end = center + u2 * r;
    if cos_half <= 0.0 {
        out.line_to(end.x, end.y);
        return;
    }
    let ctrl = center + sum.unit() * (r / cos_half);
    out.conic_to(ctrl.x, ctrl.y, end.x, end.y, cos_half);
}

// ============================================================================
// Tests
// ============================================================================
