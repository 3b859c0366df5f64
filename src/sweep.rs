//! Sweep-line primitives: snap grid, events, and the two orderings.
//!
//! The sweep runs in lexicographic `(x, y)` order. A segment's *left* end is
//! the lexicographically smaller endpoint, so a vertical segment starts at
//! its lower end. Both comparators are written so that swapping arguments
//! evaluates the same predicates with the same operands, which makes them
//! antisymmetric by construction.

use core::cmp::Ordering;

use crate::point::Point;

// ============================================================================
// Snap grid
// ============================================================================

/// Grid resolution for snap rounding: points are rounded to multiples of
/// `1 / SNAP_SCALE`.
pub const SNAP_SCALE: f64 = 1048576.0;

/// One grid step. Also the perpendicular distance under which two
/// segments count as collinear.
pub const SNAP_STEP: f64 = 1.0 / SNAP_SCALE;

#[inline]
pub fn snap(v: f64) -> f64 {
    (v * SNAP_SCALE).round() / SNAP_SCALE
}

#[inline]
pub fn snap_point(p: Point) -> Point {
    Point::new(snap(p.x), snap(p.y))
}

/// Integer grid key of an already snapped point.
#[inline]
pub fn grid_key(p: Point) -> (i64, i64) {
    ((p.x * SNAP_SCALE).round() as i64, (p.y * SNAP_SCALE).round() as i64)
}

/// Sweep order on points: by x, then by y.
#[inline]
pub fn cmp_points(a: Point, b: Point) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

// ============================================================================
// Segment records
// ============================================================================

/// Opaque record attached to every sweep segment.
///
/// `set` names the input path group, `weight` is `+1` when the input edge
/// ran from its left end to its right end and `-1` otherwise, and `data`
/// is carried through to the emitted edges untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentRef {
    pub weight: i32,
    pub set: usize,
    pub data: usize,
}

/// Geometry of a segment taking part in the sweep. `left < right` in sweep
/// order always holds; splitting only ever moves `right` leftwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSegment {
    pub id: usize,
    pub left: Point,
    pub right: Point,
    pub sref: SegmentRef,
}

impl SweepSegment {
    /// Build from an input edge `a → b`, orienting it into sweep order and
    /// recording the original direction in `weight`. Returns `None` for a
    /// zero-length edge.
    pub fn from_edge(id: usize, a: Point, b: Point, set: usize, data: usize) -> Option<Self> {
        let (left, right, weight) = match cmp_points(a, b) {
            Ordering::Less => (a, b, 1),
            Ordering::Greater => (b, a, -1),
            Ordering::Equal => return None,
        };
        Some(Self {
            id,
            left,
            right,
            sref: SegmentRef { weight, set, data },
        })
    }

    /// Does `p` lie strictly between the two ends in sweep order?
    #[inline]
    pub fn has_interior(&self, p: Point) -> bool {
        cmp_points(self.left, p) == Ordering::Less && cmp_points(p, self.right) == Ordering::Less
    }

    #[inline]
    fn key_cmp(&self, other: &SweepSegment) -> Ordering {
        cmp_points(self.left, other.left)
            .then_with(|| cmp_points(self.right, other.right))
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Perpendicular distance of `p` from this segment's supporting line.
    #[inline]
    fn line_distance(&self, p: Point) -> f64 {
        let d = self.right - self.left;
        (d.cross(p - self.left) / d.length()).abs()
    }
}

/// Are the two segments on one line, within one grid step? The line of the
/// segment with the smaller key is used, whichever way round the arguments
/// come.
pub fn segments_collinear(a: &SweepSegment, b: &SweepSegment) -> bool {
    let (base, other) = if a.key_cmp(b) == Ordering::Greater { (b, a) } else { (a, b) };
    base.line_distance(other.left) <= SNAP_STEP && base.line_distance(other.right) <= SNAP_STEP
}

// ============================================================================
// Events
// ============================================================================

/// One endpoint event. Events are created once and never changed; a
/// segment that is split or merged leaves stale events behind which the
/// engine recognizes and skips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepEvent {
    /// The endpoint this event fires at.
    pub point: Point,
    /// The segment's other endpoint.
    pub other: Point,
    /// Is `point` the segment's left end?
    pub left: bool,
    pub segment: usize,
}

impl SweepEvent {
    pub fn new(point: Point, other: Point, left: bool, segment: usize) -> Self {
        Self {
            point,
            other,
            left,
            segment,
        }
    }
}

/// Total order of the event queue.
///
/// By event point; at the same point left events first; then by direction,
/// the segment running lower first; finally by segment id.
pub fn compare_queue(a: &SweepEvent, b: &SweepEvent) -> Ordering {
    let by_point = cmp_points(a.point, b.point);
    if by_point != Ordering::Equal {
        return by_point;
    }
    if a.left != b.left {
        return if a.left { Ordering::Less } else { Ordering::Greater };
    }
    // same point, same kind: compare directions
    let s = (a.other - a.point).cross(b.other - a.point);
    if s != 0.0 {
        // for left events b.other counter-clockwise of a means b is above;
        // right events point back, which flips the sense
        let a_lower = (s > 0.0) == a.left;
        return if a_lower { Ordering::Less } else { Ordering::Greater };
    }
    a.segment.cmp(&b.segment)
}

// ============================================================================
// Status order
// ============================================================================

/// Order of two segments along the sweep line, `Less` meaning `a` is below.
///
/// Collinear segments are ordered by their keys. Segments sharing a left
/// end are ordered by direction. Segments starting on the same vertical
/// are ordered by their start heights. Otherwise the segment starting later
/// is located against the line of the other, using its right end when its
/// left end lies on that line.
pub fn compare_status(a: &SweepSegment, b: &SweepSegment) -> Ordering {
    if a.id == b.id {
        return Ordering::Equal;
    }
    if segments_collinear(a, b) {
        return a.key_cmp(b);
    }
    if a.left == b.left {
        let c = (a.right - a.left).cross(b.right - b.left);
        if c > 0.0 {
            return Ordering::Less;
        }
        if c < 0.0 {
            return Ordering::Greater;
        }
        return a.key_cmp(b);
    }
    if a.left.x == b.left.x {
        return a.left.y.total_cmp(&b.left.y);
    }

    let a_later = cmp_points(a.left, b.left) == Ordering::Greater;
    let (late, early) = if a_later { (a, b) } else { (b, a) };
    let d = early.right - early.left;
    let mut s = d.cross(late.left - early.left);
    if s.abs() <= SNAP_STEP * d.length() {
        s = d.cross(late.right - early.left);
    }
    let late_above = s > 0.0;
    match (a_later, late_above) {
        (true, true) | (false, false) => Ordering::Greater,
        (true, false) | (false, true) => Ordering::Less,
    }
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

    fn seg(id: usize, a: Point, b: Point) -> SweepSegment {
        SweepSegment::from_edge(id, a, b, 0, 0).expect("non-degenerate")
    }

    fn events(s: &SweepSegment) -> [SweepEvent; 2] {
        [
            SweepEvent::new(s.left, s.right, true, s.id),
            SweepEvent::new(s.right, s.left, false, s.id),
        ]
    }

    fn assert_antisymmetric<T, F: Fn(&T, &T) -> Ordering>(items: &[T], cmp: F) {
        for a in items {
            for b in items {
                assert_eq!(cmp(a, b), cmp(b, a).reverse());
            }
        }
    }

    #[test]
    fn test_snap() {
        assert_eq!(snap(0.5), 0.5);
        assert_eq!(snap(1.0 + SNAP_STEP * 0.4), 1.0);
        assert_eq!(snap_point(p(3.0, -2.0 - SNAP_STEP * 0.6)), p(3.0, -2.0 - SNAP_STEP));
        assert_eq!(grid_key(p(1.0, -0.5)), (1 << 20, -(1 << 19)));
    }

    #[test]
    fn test_from_edge_orients_and_weights() {
        let s = seg(0, p(5.0, 0.0), p(1.0, 0.0));
        assert_eq!(s.left, p(1.0, 0.0));
        assert_eq!(s.sref.weight, -1);
        // vertical: left is the lower end
        let v = seg(1, p(2.0, 0.0), p(2.0, 3.0));
        assert_eq!(v.left, p(2.0, 0.0));
        assert_eq!(v.sref.weight, 1);
        assert!(SweepSegment::from_edge(2, p(1.0, 1.0), p(1.0, 1.0), 0, 0).is_none());
    }

    #[test]
    fn test_touching_collinear_orders_increasing() {
        let a = seg(0, p(400.0, 400.0), p(600.0, 600.0));
        let b = seg(1, p(600.0, 600.0), p(800.0, 800.0));
        assert_eq!(compare_status(&a, &b), Ordering::Less);
        assert_eq!(compare_status(&b, &a), Ordering::Greater);
        let [al, ar] = events(&a);
        let [bl, br] = events(&b);
        assert_eq!(compare_queue(&al, &bl), Ordering::Less);
        assert_eq!(compare_queue(&bl, &al), Ordering::Greater);
        // a ends where b begins: the left event sorts first at the shared point
        assert_eq!(compare_queue(&bl, &ar), Ordering::Less);
        assert_eq!(compare_queue(&ar, &br), Ordering::Less);
    }

    #[test]
    fn test_queue_direction_tie_break() {
        let low = seg(0, p(0.0, 0.0), p(10.0, -1.0));
        let high = seg(1, p(0.0, 0.0), p(10.0, 1.0));
        assert_eq!(compare_queue(&events(&low)[0], &events(&high)[0]), Ordering::Less);
        let low_r = seg(2, p(-10.0, -1.0), p(0.0, 0.0));
        let high_r = seg(3, p(-10.0, 1.0), p(0.0, 0.0));
        assert_eq!(compare_queue(&events(&low_r)[1], &events(&high_r)[1]), Ordering::Less);
    }

    #[test]
    fn test_status_shared_left_by_angle() {
        let flat = seg(0, p(0.0, 0.0), p(10.0, 0.0));
        let up = seg(1, p(0.0, 0.0), p(10.0, 5.0));
        let vertical = seg(2, p(0.0, 0.0), p(0.0, 5.0));
        assert_eq!(compare_status(&flat, &up), Ordering::Less);
        assert_eq!(compare_status(&up, &vertical), Ordering::Less);
        assert_eq!(compare_status(&vertical, &flat), Ordering::Greater);
    }

    #[test]
    fn test_status_by_line_side() {
        let long = seg(0, p(0.0, 0.0), p(10.0, 10.0));
        let above = seg(1, p(2.0, 8.0), p(6.0, 9.0));
        let below = seg(2, p(3.0, 0.0), p(6.0, 1.0));
        assert_eq!(compare_status(&above, &long), Ordering::Greater);
        assert_eq!(compare_status(&long, &above), Ordering::Less);
        assert_eq!(compare_status(&below, &long), Ordering::Less);
        // starting on the other line: decided by where it goes
        let t = seg(3, p(5.0, 5.0), p(9.0, 5.0));
        assert_eq!(compare_status(&t, &long), Ordering::Less);
    }

    #[test]
    fn test_orderings_antisymmetric() {
        let pts = [
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(5.0, 5.0),
            p(0.0, 10.0),
            p(10.0, 10.0),
            p(5.0, -3.0),
            p(7.5, 2.5),
        ];
        let mut segs = Vec::new();
        for (i, &a) in pts.iter().enumerate() {
            for &b in &pts[i + 1..] {
                if let Some(s) = SweepSegment::from_edge(segs.len(), a, b, 0, 0) {
                    segs.push(s);
                }
            }
        }
        assert_antisymmetric(&segs, compare_status);
        let evs: Vec<SweepEvent> = segs.iter().flat_map(events).collect();
        assert_antisymmetric(&evs, compare_queue);
    }

    #[test]
    fn test_collinear_threshold() {
        let a = seg(0, p(0.0, 0.0), p(10.0, 0.0));
        let near = seg(1, p(2.0, SNAP_STEP * 0.5), p(12.0, 0.0));
        let far = seg(2, p(2.0, SNAP_STEP * 4.0), p(12.0, 0.0));
        assert!(segments_collinear(&a, &near));
        assert!(segments_collinear(&near, &a));
        assert!(!segments_collinear(&a, &far));
    }
}
