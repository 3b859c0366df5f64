//! Bezier and conic curve generators and geometry helpers.
//!
//! The incremental flatteners (`Curve3Inc`, `Curve4Inc`, `ConicInc`) walk a
//! curve at a fixed number of parameter steps derived from the control
//! polygon length and the approximation scale. The free functions evaluate,
//! split and approximate curves for the stroker.

use crate::basics::{uround, VertexSource, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP};
use crate::point::{Point, Vector};

/// Steps never go below this, so short curves still bend.
const CURVE_MIN_STEPS: i32 = 4;

/// Upper bound on steps for a single curve.
const CURVE_MAX_STEPS: i32 = 4096;

fn num_steps(len: f64, scale: f64) -> i32 {
    if !len.is_finite() {
        return CURVE_MIN_STEPS;
    }
    (uround(len * 0.25 * scale) as i32).clamp(CURVE_MIN_STEPS, CURVE_MAX_STEPS)
}

// ============================================================================
// Curve3Inc: incremental (forward differences) quadratic Bezier
// ============================================================================

/// Incremental quadratic Bezier curve flattener using forward differences.
pub struct Curve3Inc {
    num_steps: i32,
    step: i32,
    scale: f64,
    start: Point,
    end: Point,
    f: Point,
    df: Vector,
    ddf: Vector,
    saved_f: Point,
    saved_df: Vector,
}

impl Curve3Inc {
    pub fn new() -> Self {
        Self {
            num_steps: 0,
            step: -1,
            scale: 1.0,
            start: Point::ORIGIN,
            end: Point::ORIGIN,
            f: Point::ORIGIN,
            df: Vector::ZERO,
            ddf: Vector::ZERO,
            saved_f: Point::ORIGIN,
            saved_df: Vector::ZERO,
        }
    }

    pub fn reset(&mut self) {
        self.num_steps = 0;
        self.step = -1;
    }

    pub fn init(&mut self, p1: Point, p2: Point, p3: Point) {
        self.start = p1;
        self.end = p3;

        let len = (p2 - p1).length() + (p3 - p2).length();
        self.num_steps = num_steps(len, self.scale);

        let subdivide_step = 1.0 / self.num_steps as f64;
        let subdivide_step2 = subdivide_step * subdivide_step;

        let tmp = Vector::new(p1.x - p2.x * 2.0 + p3.x, p1.y - p2.y * 2.0 + p3.y) * subdivide_step2;

        self.f = p1;
        self.saved_f = p1;
        self.df = tmp + (p2 - p1) * (2.0 * subdivide_step);
        self.saved_df = self.df;
        self.ddf = tmp * 2.0;

        self.step = self.num_steps;
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.scale
    }
}

impl Default for Curve3Inc {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve3Inc {
    fn rewind(&mut self, _path_id: u32) {
        if self.num_steps == 0 {
            self.step = -1;
            return;
        }
        self.step = self.num_steps;
        self.f = self.saved_f;
        self.df = self.saved_df;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.step < 0 {
            return PATH_CMD_STOP;
        }
        if self.step == self.num_steps {
            *x = self.start.x;
            *y = self.start.y;
            self.step -= 1;
            return PATH_CMD_MOVE_TO;
        }
        if self.step == 0 {
            *x = self.end.x;
            *y = self.end.y;
            self.step -= 1;
            return PATH_CMD_LINE_TO;
        }
        self.f += self.df;
        self.df = self.df + self.ddf;
        *x = self.f.x;
        *y = self.f.y;
        self.step -= 1;
        PATH_CMD_LINE_TO
    }
}

// ============================================================================
// Curve4Inc: incremental (forward differences) cubic Bezier
// ============================================================================

/// Incremental cubic Bezier curve flattener using forward differences.
pub struct Curve4Inc {
    num_steps: i32,
    step: i32,
    scale: f64,
    start: Point,
    end: Point,
    f: Point,
    df: Vector,
    ddf: Vector,
    dddf: Vector,
    saved_f: Point,
    saved_df: Vector,
    saved_ddf: Vector,
}

impl Curve4Inc {
    pub fn new() -> Self {
        Self {
            num_steps: 0,
            step: -1,
            scale: 1.0,
            start: Point::ORIGIN,
            end: Point::ORIGIN,
            f: Point::ORIGIN,
            df: Vector::ZERO,
            ddf: Vector::ZERO,
            dddf: Vector::ZERO,
            saved_f: Point::ORIGIN,
            saved_df: Vector::ZERO,
            saved_ddf: Vector::ZERO,
        }
    }

    pub fn reset(&mut self) {
        self.num_steps = 0;
        self.step = -1;
    }

    pub fn init(&mut self, p1: Point, p2: Point, p3: Point, p4: Point) {
        self.start = p1;
        self.end = p4;

        let len = (p2 - p1).length() + (p3 - p2).length() + (p4 - p3).length();
        self.num_steps = num_steps(len, self.scale);

        let subdivide_step = 1.0 / self.num_steps as f64;
        let subdivide_step2 = subdivide_step * subdivide_step;
        let subdivide_step3 = subdivide_step * subdivide_step * subdivide_step;

        let pre1 = 3.0 * subdivide_step;
        let pre2 = 3.0 * subdivide_step2;
        let pre4 = 6.0 * subdivide_step2;
        let pre5 = 6.0 * subdivide_step3;

        let tmp1 = Vector::new(p1.x - p2.x * 2.0 + p3.x, p1.y - p2.y * 2.0 + p3.y);
        let tmp2 = Vector::new(
            (p2.x - p3.x) * 3.0 - p1.x + p4.x,
            (p2.y - p3.y) * 3.0 - p1.y + p4.y,
        );

        self.f = p1;
        self.saved_f = p1;
        self.df = (p2 - p1) * pre1 + tmp1 * pre2 + tmp2 * subdivide_step3;
        self.saved_df = self.df;
        self.ddf = tmp1 * pre4 + tmp2 * pre5;
        self.saved_ddf = self.ddf;
        self.dddf = tmp2 * pre5;

        self.step = self.num_steps;
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.scale
    }
}

impl Default for Curve4Inc {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve4Inc {
    fn rewind(&mut self, _path_id: u32) {
        if self.num_steps == 0 {
            self.step = -1;
            return;
        }
        self.step = self.num_steps;
        self.f = self.saved_f;
        self.df = self.saved_df;
        self.ddf = self.saved_ddf;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.step < 0 {
            return PATH_CMD_STOP;
        }
        if self.step == self.num_steps {
            *x = self.start.x;
            *y = self.start.y;
            self.step -= 1;
            return PATH_CMD_MOVE_TO;
        }
        if self.step == 0 {
            *x = self.end.x;
            *y = self.end.y;
            self.step -= 1;
            return PATH_CMD_LINE_TO;
        }

        self.f += self.df;
        self.df = self.df + self.ddf;
        self.ddf = self.ddf + self.dddf;

        *x = self.f.x;
        *y = self.f.y;
        self.step -= 1;
        PATH_CMD_LINE_TO
    }
}

// ============================================================================
// ConicInc: uniform-parameter rational quadratic
// ============================================================================

/// Conic (rational quadratic) flattener. A rational curve has no constant
/// forward differences, so each step evaluates the curve directly.
pub struct ConicInc {
    num_steps: i32,
    step: i32,
    scale: f64,
    conic: Conic,
}

impl ConicInc {
    pub fn new() -> Self {
        Self {
            num_steps: 0,
            step: -1,
            scale: 1.0,
            conic: Conic::new(Point::ORIGIN, Point::ORIGIN, Point::ORIGIN, 1.0),
        }
    }

    pub fn reset(&mut self) {
        self.num_steps = 0;
        self.step = -1;
    }

    pub fn init(&mut self, p1: Point, p2: Point, p3: Point, w: f64) {
        self.conic = Conic::new(p1, p2, p3, w);
        let len = (p2 - p1).length() + (p3 - p2).length();
        self.num_steps = num_steps(len, self.scale);
        self.step = self.num_steps;
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.scale
    }
}

impl Default for ConicInc {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for ConicInc {
    fn rewind(&mut self, _path_id: u32) {
        self.step = if self.num_steps == 0 { -1 } else { self.num_steps };
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.step < 0 {
            return PATH_CMD_STOP;
        }
        let cmd = if self.step == self.num_steps {
            PATH_CMD_MOVE_TO
        } else {
            PATH_CMD_LINE_TO
        };
        let p = match self.step {
            s if s == self.num_steps => self.conic.p0,
            0 => self.conic.p2,
            s => self.conic.eval(1.0 - s as f64 / self.num_steps as f64),
        };
        *x = p.x;
        *y = p.y;
        self.step -= 1;
        cmd
    }
}

// ============================================================================
// Quadratic helpers
// ============================================================================

#[inline]
pub fn quad_eval(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    a.lerp(b, t)
}

/// Derivative direction of a quadratic at `t` (not normalized).
#[inline]
pub fn quad_tangent(p0: Point, p1: Point, p2: Point, t: f64) -> Vector {
    let d0 = p1 - p0;
    let d1 = p2 - p1;
    let v = d0 * (1.0 - t) + d1 * t;
    if v.is_zero() {
        // control point coincides with an end point
        p2 - p0
    } else {
        v
    }
}

/// Split a quadratic at `t` with de Casteljau.
pub fn quad_split(p0: Point, p1: Point, p2: Point, t: f64) -> ([Point; 3], [Point; 3]) {
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    let m = a.lerp(b, t);
    ([p0, a, m], [m, b, p2])
}

/// Parameter where a quadratic's derivative vanishes, if it does so strictly
/// inside the curve. That only happens when the control polygon folds back
/// on itself (collinear points with the control beyond an end).
pub fn quad_cusp(p0: Point, p1: Point, p2: Point) -> Option<f64> {
    let d0 = p1 - p0;
    let d1 = p2 - p1;
    let dd = d0 - d1;
    let len2 = dd.length_squared();
    if len2 == 0.0 {
        return None;
    }
    if d0.cross(d1).abs() > 1e-9 * (d0.length() * d1.length()).max(f64::MIN_POSITIVE) {
        return None;
    }
    if d0.dot(d1) >= 0.0 {
        return None;
    }
    let t = d0.dot(dd) / len2;
    if t > 0.0 && t < 1.0 {
        Some(t)
    } else {
        None
    }
}

// ============================================================================
// Cubic helpers
// ============================================================================

pub fn cubic_eval(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let ab = p0.lerp(p1, t);
    let bc = p1.lerp(p2, t);
    let cd = p2.lerp(p3, t);
    ab.lerp(bc, t).lerp(bc.lerp(cd, t), t)
}

/// Split a cubic at `t` with de Casteljau.
pub fn cubic_split(p: [Point; 4], t: f64) -> ([Point; 4], [Point; 4]) {
    let ab = p[0].lerp(p[1], t);
    let bc = p[1].lerp(p[2], t);
    let cd = p[2].lerp(p[3], t);
    let abc = ab.lerp(bc, t);
    let bcd = bc.lerp(cd, t);
    let m = abc.lerp(bcd, t);
    ([p[0], ab, abc, m], [m, bcd, cd, p[3]])
}

/// Approximate a cubic by quadratics whose midpoint deviation stays within
/// `tolerance`. Each returned triple is `[start, control, end]`.
pub fn cubic_to_quads(p: [Point; 4], tolerance: f64) -> Vec<[Point; 3]> {
    let third = Vector::new(
        p[3].x - 3.0 * p[2].x + 3.0 * p[1].x - p[0].x,
        p[3].y - 3.0 * p[2].y + 3.0 * p[1].y - p[0].y,
    );
    let err = third.length() * 3f64.sqrt() / 36.0;
    let tol = tolerance.max(1e-9);
    let n = if err <= tol {
        1
    } else {
        ((err / tol).cbrt().ceil() as usize).clamp(1, 64)
    };

    let mut quads = Vec::with_capacity(n);
    let mut rest = p;
    for i in 0..n {
        let piece = if i + 1 == n {
            rest
        } else {
            let (head, tail) = cubic_split(rest, 1.0 / (n - i) as f64);
            rest = tail;
            head
        };
        let c = Point::new(
            (3.0 * (piece[1].x + piece[2].x) - piece[0].x - piece[3].x) * 0.25,
            (3.0 * (piece[1].y + piece[2].y) - piece[0].y - piece[3].y) * 0.25,
        );
        quads.push([piece[0], c, piece[3]]);
    }
    quads
}

// ============================================================================
// Conic
// ============================================================================

/// A rational quadratic `p0, p1, p2` with weight `w` on `p1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub w: f64,
}

impl Conic {
    pub fn new(p0: Point, p1: Point, p2: Point, w: f64) -> Self {
        Self { p0, p1, p2, w }
    }

    /// Point at parameter `t`.
    pub fn eval(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let a = u * u;
        let b = 2.0 * t * u * self.w;
        let c = t * t;
        let den = a + b + c;
        Point::new(
            (a * self.p0.x + b * self.p1.x + c * self.p2.x) / den,
            (a * self.p0.y + b * self.p1.y + c * self.p2.y) / den,
        )
    }

    /// Split at `t = 0.5`; both halves are again in standard form.
    pub fn split(&self) -> (Conic, Conic) {
        let w = self.w;
        let scale = 1.0 / (1.0 + w);
        let a = Point::new((self.p0.x + w * self.p1.x) * scale, (self.p0.y + w * self.p1.y) * scale);
        let b = Point::new((w * self.p1.x + self.p2.x) * scale, (w * self.p1.y + self.p2.y) * scale);
        let m = Point::new(
            (self.p0.x + 2.0 * w * self.p1.x + self.p2.x) * scale * 0.5,
            (self.p0.y + 2.0 * w * self.p1.y + self.p2.y) * scale * 0.5,
        );
        let new_w = (0.5 + w * 0.5).sqrt();
        (Conic::new(self.p0, a, m, new_w), Conic::new(m, b, self.p2, new_w))
    }

    /// Approximate by quadratics, halving until the weight's pull on the
    /// control point moves the curve by less than `tolerance`.
    pub fn to_quads(&self, tolerance: f64) -> Vec<[Point; 3]> {
        if !(self.w.is_finite() && self.w > 0.0) {
            return vec![[self.p0, self.p0.midpoint(self.p2), self.p2]];
        }
        let a = self.w - 1.0;
        let k = a / (4.0 * (2.0 + a));
        let mut err = Vector::new(
            k * (self.p0.x - 2.0 * self.p1.x + self.p2.x),
            k * (self.p0.y - 2.0 * self.p1.y + self.p2.y),
        )
        .length();
        let mut levels = 0;
        while err > tolerance && levels < 5 {
            err *= 0.25;
            levels += 1;
        }

        let mut pieces = vec![*self];
        for _ in 0..levels {
            pieces = pieces
                .iter()
                .flat_map(|c| {
                    let (l, r) = c.split();
                    [l, r]
                })
                .collect();
        }
        pieces.iter().map(|c| [c.p0, c.p1, c.p2]).collect()
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

    fn collect(vs: &mut dyn VertexSource) -> Vec<(u32, Point)> {
        vs.rewind(0);
        let mut out = Vec::new();
        let (mut x, mut y) = (0.0, 0.0);
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if cmd == PATH_CMD_STOP {
                break;
            }
            out.push((cmd, p(x, y)));
        }
        out
    }

    #[test]
    fn test_curve3_inc_endpoints() {
        let mut c = Curve3Inc::new();
        c.init(p(0.0, 0.0), p(50.0, 100.0), p(100.0, 0.0));
        let v = collect(&mut c);
        assert_eq!(v.first().map(|e| e.0), Some(PATH_CMD_MOVE_TO));
        assert_eq!(v.first().map(|e| e.1), Some(p(0.0, 0.0)));
        assert_eq!(v.last().map(|e| e.1), Some(p(100.0, 0.0)));
        // every generated point lies on the curve
        let n = v.len() - 1;
        for (i, (_, q)) in v.iter().enumerate() {
            let expect = quad_eval(p(0.0, 0.0), p(50.0, 100.0), p(100.0, 0.0), i as f64 / n as f64);
            assert!(q.approx_eq(expect, 1e-9));
        }
    }

    #[test]
    fn test_curve4_inc_on_curve() {
        let pts = [p(0.0, 0.0), p(0.0, 100.0), p(100.0, 100.0), p(100.0, 0.0)];
        let mut c = Curve4Inc::new();
        c.init(pts[0], pts[1], pts[2], pts[3]);
        let v = collect(&mut c);
        let n = v.len() - 1;
        assert!(n >= 4);
        for (i, (_, q)) in v.iter().enumerate() {
            let expect = cubic_eval(pts[0], pts[1], pts[2], pts[3], i as f64 / n as f64);
            assert!(q.approx_eq(expect, 1e-7));
        }
    }

    #[test]
    fn test_conic_quarter_circle_on_circle() {
        let mut c = ConicInc::new();
        c.init(p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), std::f64::consts::FRAC_1_SQRT_2);
        for (_, q) in collect(&mut c) {
            assert!((q.to_vector().length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_min_steps() {
        let mut c = Curve3Inc::new();
        c.init(p(0.0, 0.0), p(0.1, 0.1), p(0.2, 0.0));
        assert_eq!(collect(&mut c).len(), (CURVE_MIN_STEPS + 1) as usize);
    }

    #[test]
    fn test_quad_split_matches_eval() {
        let (a, b, c) = (p(0.0, 0.0), p(10.0, 20.0), p(30.0, 0.0));
        let (l, r) = quad_split(a, b, c, 0.3);
        assert!(l[2].approx_eq(quad_eval(a, b, c, 0.3), 1e-12));
        assert!(quad_eval(l[0], l[1], l[2], 0.5).approx_eq(quad_eval(a, b, c, 0.15), 1e-12));
        assert!(quad_eval(r[0], r[1], r[2], 0.5).approx_eq(quad_eval(a, b, c, 0.65), 1e-12));
    }

    #[test]
    fn test_quad_cusp() {
        // folds back: 0 → 10 → 5 along x
        let t = quad_cusp(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 0.0)).expect("cusp");
        assert!(quad_tangent(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 0.0), t).length() < 1e-9);
        assert!(quad_cusp(p(0.0, 0.0), p(5.0, 5.0), p(10.0, 0.0)).is_none());
        assert!(quad_cusp(p(0.0, 0.0), p(5.0, 0.0), p(10.0, 0.0)).is_none());
    }

    #[test]
    fn test_cubic_to_quads_continuity() {
        let pts = [p(0.0, 0.0), p(0.0, 100.0), p(100.0, 100.0), p(100.0, 0.0)];
        let quads = cubic_to_quads(pts, 0.1);
        assert!(quads.len() > 1);
        assert_eq!(quads[0][0], pts[0]);
        assert!(quads.last().map(|q| q[2]) == Some(pts[3]));
        for w in quads.windows(2) {
            assert!(w[0][2].approx_eq(w[1][0], 1e-9));
        }
        // the midpoint of the whole approximation is near the cubic's
        let mid = cubic_eval(pts[0], pts[1], pts[2], pts[3], 0.5);
        let best = quads
            .iter()
            .flat_map(|q| (0..=8).map(move |i| quad_eval(q[0], q[1], q[2], i as f64 / 8.0)))
            .map(|s| s.distance(mid))
            .fold(f64::MAX, f64::min);
        assert!(best < 0.5);
    }

    #[test]
    fn test_conic_split_and_quads() {
        let c = Conic::new(p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), std::f64::consts::FRAC_1_SQRT_2);
        let (l, r) = c.split();
        assert!(l.p2.approx_eq(c.eval(0.5), 1e-12));
        assert!((l.eval(0.5).to_vector().length() - 1.0).abs() < 1e-12);
        assert!((r.eval(0.3).to_vector().length() - 1.0).abs() < 1e-12);
        let quads = c.to_quads(0.001);
        assert!(quads.len() >= 4);
        assert_eq!(quads[0][0], c.p0);
    }
}
