//! Geometric math utilities.
//!
//! Orientation, distances, line intersection, polygon area and the in-circle
//! predicate, all expressed over [`Point`].

use crate::point::Point;

// ============================================================================
// Constants
// ============================================================================

/// Coinciding points maximal distance (epsilon).
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

/// Epsilon for intersection calculations.
pub const INTERSECTION_EPSILON: f64 = 1.0e-30;

// ============================================================================
// Orientation and point-in-triangle
// ============================================================================

/// Twice the signed area of triangle `a, b, c`.
/// Positive when `c` lies to the left of the directed line `a → b` (y up).
#[inline]
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Test if `p` lies strictly inside the triangle `a, b, c` (either winding).
#[inline]
pub fn point_in_triangle(a: Point, b: Point, c: Point, p: Point) -> bool {
    let o1 = orient(a, b, p);
    let o2 = orient(b, c, p);
    let o3 = orient(c, a, p);
    (o1 > 0.0 && o2 > 0.0 && o3 > 0.0) || (o1 < 0.0 && o2 < 0.0 && o3 < 0.0)
}

// ============================================================================
// Distance calculations
// ============================================================================

/// Euclidean distance between two points.
#[inline]
pub fn calc_distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Signed distance from `p` to the infinite line through `a → b`.
/// Positive means left side. A degenerate line measures the distance to `a`.
#[inline]
pub fn calc_line_point_distance(a: Point, b: Point, p: Point) -> f64 {
    let d = (b - a).length();
    if d < VERTEX_DIST_EPSILON {
        return a.distance(p);
    }
    orient(a, b, p) / d
}

/// Parameter of the projection of `p` onto the segment `a → b`.
/// Returns 0 if the segment is degenerate.
#[inline]
pub fn calc_segment_point_u(a: Point, b: Point, p: Point) -> f64 {
    let d = b - a;
    if d.is_zero() {
        return 0.0;
    }
    (p - a).dot(d) / d.length_squared()
}

/// Squared distance from `p` to the closest point on segment `a → b`.
#[inline]
pub fn calc_segment_point_sq_distance(a: Point, b: Point, p: Point) -> f64 {
    let u = calc_segment_point_u(a, b, p);
    if u <= 0.0 {
        p.distance_squared(a)
    } else if u >= 1.0 {
        p.distance_squared(b)
    } else {
        p.distance_squared(a.lerp(b, u))
    }
}

// ============================================================================
// Intersection
// ============================================================================

/// Intersection of the infinite lines `a → b` and `c → d`.
/// Returns `None` if they are parallel.
#[inline]
pub fn calc_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
    let num = (a.y - c.y) * (d.x - c.x) - (a.x - c.x) * (d.y - c.y);
    let den = (b.x - a.x) * (d.y - c.y) - (b.y - a.y) * (d.x - c.x);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    Some(a.lerp(b, num / den))
}

/// Quick check whether segments `a → b` and `c → d` properly cross
/// (touching endpoints excluded).
#[inline]
pub fn intersection_exists(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
}

// ============================================================================
// Areas
// ============================================================================

/// Signed area of triangle `a, b, c`.
#[inline]
pub fn calc_triangle_area(a: Point, b: Point, c: Point) -> f64 {
    orient(a, b, c) * 0.5
}

/// Signed area of a closed polygon (shoelace). Counter-clockwise is positive.
pub fn calc_polygon_area(vertices: &[Point]) -> f64 {
    let Some(&first) = vertices.first() else {
        return 0.0;
    };
    let mut sum = 0.0;
    let mut prev = first;
    for &v in &vertices[1..] {
        sum += prev.x * v.y - prev.y * v.x;
        prev = v;
    }
    (sum + prev.x * first.y - prev.y * first.x) * 0.5
}

/// In-circle predicate for Delaunay refinement.
///
/// Positive when `p` lies inside the circle through `a, b, c` given
/// counter-clockwise, negative outside, zero on the circle.
pub fn in_circle(p: Point, a: Point, b: Point, c: Point) -> f64 {
    let ad = a - p;
    let bd = b - p;
    let cd = c - p;

    let ab_det = ad.cross(bd);
    let bc_det = bd.cross(cd);
    let ca_det = cd.cross(ad);

    ad.length_squared() * bc_det + bd.length_squared() * ca_det + cd.length_squared() * ab_det
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_orient() {
        assert!(orient(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)) > 0.0);
        assert!(orient(p(0.0, 0.0), p(1.0, 0.0), p(0.0, -1.0)) < 0.0);
        assert_eq!(orient(p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_point_in_triangle() {
        let (a, b, c) = (p(0.0, 0.0), p(10.0, 0.0), p(0.0, 10.0));
        assert!(point_in_triangle(a, b, c, p(1.0, 1.0)));
        assert!(point_in_triangle(a, c, b, p(1.0, 1.0)));
        assert!(!point_in_triangle(a, b, c, p(6.0, 6.0)));
        // on the boundary is not strictly inside
        assert!(!point_in_triangle(a, b, c, p(5.0, 0.0)));
    }

    #[test]
    fn test_line_point_distance() {
        let d = calc_line_point_distance(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 3.0));
        assert!((d - 3.0).abs() < 1e-12);
        let d = calc_line_point_distance(p(0.0, 0.0), p(10.0, 0.0), p(5.0, -3.0));
        assert!((d + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_point_distance() {
        let a = p(0.0, 0.0);
        let b = p(10.0, 0.0);
        assert!((calc_segment_point_sq_distance(a, b, p(5.0, 2.0)) - 4.0).abs() < 1e-12);
        assert!((calc_segment_point_sq_distance(a, b, p(-3.0, 4.0)) - 25.0).abs() < 1e-12);
        assert!((calc_segment_point_u(a, b, p(2.5, 9.0)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_calc_intersection() {
        let x = calc_intersection(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0));
        let x = x.expect("lines cross");
        assert!(x.approx_eq(p(5.0, 5.0), 1e-12));
        assert!(calc_intersection(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_intersection_exists() {
        assert!(intersection_exists(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(2.0, 0.0)));
        assert!(!intersection_exists(p(0.0, 0.0), p(1.0, 1.0), p(1.0, 1.0), p(2.0, 0.0)));
    }

    #[test]
    fn test_polygon_area() {
        let square = [p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)];
        assert!((calc_polygon_area(&square) - 4.0).abs() < 1e-12);
        let mut reversed = square;
        reversed.reverse();
        assert!((calc_polygon_area(&reversed) + 4.0).abs() < 1e-12);
        assert_eq!(calc_polygon_area(&[]), 0.0);
        assert!((calc_triangle_area(p(0.0, 0.0), p(4.0, 0.0), p(0.0, 3.0)) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_in_circle() {
        let (a, b, c) = (p(0.0, 0.0), p(2.0, 0.0), p(0.0, 2.0));
        assert!(in_circle(p(1.0, 1.0), a, b, c) > 0.0);
        assert!(in_circle(p(5.0, 5.0), a, b, c) < 0.0);
        assert!(in_circle(p(2.0, 2.0), a, b, c).abs() < 1e-9);
    }
}
