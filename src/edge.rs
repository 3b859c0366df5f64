//! Straight edge value type.
//!
//! An `Edge` is just two endpoints. It answers the intersection and distance
//! queries the clip engine and the mesh builder ask of line segments.

use crate::math::{calc_line_point_distance, calc_segment_point_sq_distance, orient};
use crate::point::{Point, Vector};

/// Result of intersecting two edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeIntersection {
    /// The edges do not meet.
    None,
    /// The edges meet in exactly one point (crossing, T-junction or shared endpoint).
    Point(Point),
    /// The edges are collinear and share the sub-segment `from → to`
    /// (ordered along the first edge).
    Overlap(Point, Point),
}

/// A directed straight segment `a → b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: Point,
    pub b: Point,
}

impl Edge {
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn vector(&self) -> Vector {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    #[inline]
    pub fn reversed(&self) -> Edge {
        Edge::new(self.b, self.a)
    }

    /// Point at parameter `t` along the edge.
    #[inline]
    pub fn at(&self, t: f64) -> Point {
        self.a.lerp(self.b, t)
    }

    /// Twice the signed area of `a, b, p`; positive when `p` is on the left.
    #[inline]
    pub fn side(&self, p: Point) -> f64 {
        orient(self.a, self.b, p)
    }

    /// Signed perpendicular distance from `p` to the supporting line.
    #[inline]
    pub fn line_distance(&self, p: Point) -> f64 {
        calc_line_point_distance(self.a, self.b, p)
    }

    /// Unsigned distance from `p` to the closest point of the segment.
    #[inline]
    pub fn distance(&self, p: Point) -> f64 {
        calc_segment_point_sq_distance(self.a, self.b, p).sqrt()
    }

    /// Parameter of the projection of `p` onto the supporting line.
    #[inline]
    pub fn project(&self, p: Point) -> f64 {
        let d = self.vector();
        let len2 = d.length_squared();
        if len2 == 0.0 {
            return 0.0;
        }
        (p - self.a).dot(d) / len2
    }

    /// Are both endpoints of `other` within `eps` of this edge's supporting line?
    pub fn is_collinear(&self, other: &Edge, eps: f64) -> bool {
        self.line_distance(other.a).abs() <= eps && self.line_distance(other.b).abs() <= eps
    }

    /// Intersect two edges. Endpoints lying within `eps` of the other edge
    /// are reported exactly (no recomputed crossing point), and collinear
    /// edges report their shared interval.
    pub fn intersect(&self, other: &Edge, eps: f64) -> EdgeIntersection {
        if self.is_degenerate() || other.is_degenerate() {
            return EdgeIntersection::None;
        }

        if self.is_collinear(other, eps) {
            return self.collinear_overlap(other, eps);
        }

        for &p in &[self.a, self.b] {
            if p == other.a || p == other.b {
                return EdgeIntersection::Point(p);
            }
        }
        for &p in &[other.a, other.b] {
            if self.distance(p) <= eps {
                return EdgeIntersection::Point(p);
            }
        }
        for &p in &[self.a, self.b] {
            if other.distance(p) <= eps {
                return EdgeIntersection::Point(p);
            }
        }

        let r = self.vector();
        let s = other.vector();
        let den = r.cross(s);
        if den == 0.0 {
            return EdgeIntersection::None;
        }
        let qp = other.a - self.a;
        let t = qp.cross(s) / den;
        let u = qp.cross(r) / den;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            EdgeIntersection::Point(self.at(t))
        } else {
            EdgeIntersection::None
        }
    }

    fn collinear_overlap(&self, other: &Edge, eps: f64) -> EdgeIntersection {
        let len = self.length();
        let t0 = self.project(other.a);
        let t1 = self.project(other.b);
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        let tol = eps / len;
        if hi - lo > tol {
            let from = if lo == 0.0 { self.a } else if lo == t0 { other.a } else { other.b };
            let to = if hi == 1.0 { self.b } else if hi == t0 { other.a } else { other.b };
            EdgeIntersection::Overlap(from, to)
        } else if hi - lo >= -tol {
            // touching at one end
            let t = (lo + hi) * 0.5;
            let candidates = [self.a, self.b, other.a, other.b];
            let at = self.at(t);
            let p = candidates
                .iter()
                .copied()
                .min_by(|x, y| x.distance_squared(at).total_cmp(&y.distance_squared(at)))
                .unwrap_or(at);
            EdgeIntersection::Point(p)
        } else {
            EdgeIntersection::None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
