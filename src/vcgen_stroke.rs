//! Stroke and offset outline generator.
//!
//! `Stroker` turns a centerline path into a fillable outline. Every subpath
//! is reduced to a chain of line and quadratic pieces (cubics and conics
//! are approximated by quadratics first), each piece is offset along its
//! left normal, and `MathStroke` fills the corners between consecutive
//! offset pieces and the caps at open ends.
//!
//! An open subpath becomes one closed contour: the left rail forward, the
//! end cap, the right rail backward and the start cap. A closed subpath
//! becomes two closed contours, one per rail, wound in opposite
//! directions.

use crate::curves::{cubic_to_quads, quad_cusp, quad_eval, quad_split, Conic};
use crate::math::VERTEX_DIST_EPSILON;
use crate::math_stroke::{InnerJoin, LineCap, LineJoin, MathStroke};
use crate::path_storage::{Path, PathSegment};
use crate::point::{Point, Vector};
use crate::style::{DashPattern, StrokeStyle};
use crate::vcgen_dash::dash_path;

/// Quadratic pieces turning more than this (as a cosine between end
/// tangents) are halved before offsetting.
const COS_PI_8: f64 = 0.923_879_532_511_286_7;
const MAX_QUAD_DEPTH: u32 = 6;

#[inline]
fn coincident(a: Point, b: Point) -> bool {
    a.distance_squared(b) <= VERTEX_DIST_EPSILON * VERTEX_DIST_EPSILON
}

// ============================================================================
// Pieces
// ============================================================================

/// One centerline piece with a well-defined tangent at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece {
    Line(Point, Point),
    Quad(Point, Point, Point),
}

impl Piece {
    fn start(&self) -> Point {
        match *self {
            Piece::Line(a, _) | Piece::Quad(a, _, _) => a,
        }
    }

    fn end(&self) -> Point {
        match *self {
            Piece::Line(_, b) | Piece::Quad(_, _, b) => b,
        }
    }

    fn start_tangent(&self) -> Vector {
        match *self {
            Piece::Line(a, b) => (b - a).unit(),
            Piece::Quad(a, c, _) => (c - a).unit(),
        }
    }

    fn end_tangent(&self) -> Vector {
        match *self {
            Piece::Line(a, b) => (b - a).unit(),
            Piece::Quad(_, c, b) => (b - c).unit(),
        }
    }

    fn chord(&self) -> f64 {
        self.start().distance(self.end())
    }

    fn reversed(&self) -> Piece {
        match *self {
            Piece::Line(a, b) => Piece::Line(b, a),
            Piece::Quad(a, c, b) => Piece::Quad(b, c, a),
        }
    }

    /// The piece moved `d` along its left normal. A quadratic keeps its end
    /// normals; its control point moves to where the offset end tangents
    /// meet.
    fn offset(&self, d: f64) -> Piece {
        match *self {
            Piece::Line(a, b) => {
                let n = (b - a).unit().normal() * d;
                Piece::Line(a + n, b + n)
            }
            Piece::Quad(a, c, b) => {
                let n0 = self.start_tangent().normal();
                let n1 = self.end_tangent().normal();
                let a1 = a + n0 * d;
                let b1 = b + n1 * d;
                let sum = n0 + n1;
                let len2 = sum.length_squared();
                let c1 = if len2 < 1e-12 {
                    a1.midpoint(b1)
                } else {
                    c + sum * (2.0 * d / len2)
                };
                Piece::Quad(a1, c1, b1)
            }
        }
    }

    fn emit(&self, out: &mut Path) {
        match *self {
            Piece::Line(_, b) => out.line_to(b.x, b.y),
            Piece::Quad(_, c, b) => out.quad_to(c.x, c.y, b.x, b.y),
        }
    }
}

/// A subpath reduced to pieces. `round[i]` forces a round join on the
/// corner entering piece `i`.
#[derive(Debug, Default)]
struct Contour {
    pieces: Vec<Piece>,
    round: Vec<bool>,
    closed: bool,
    start: Point,
    drawn: bool,
}

impl Contour {
    fn new(start: Point) -> Self {
        Self { start, ..Self::default() }
    }

    fn push(&mut self, piece: Piece, round: bool) {
        self.pieces.push(piece);
        self.round.push(round);
    }

    fn add_line(&mut self, a: Point, b: Point) {
        self.drawn = true;
        if coincident(a, b) {
            log::trace!("stroke: dropped zero-length segment at ({}, {})", a.x, a.y);
            return;
        }
        self.push(Piece::Line(a, b), false);
    }

    fn add_quad(&mut self, p0: Point, c: Point, p2: Point, depth: u32) {
        self.drawn = true;
        let d0 = c - p0;
        let d1 = p2 - c;
        let collinear = d0.cross(d1).abs() <= 1e-9 * d0.length() * d1.length();
        if collinear {
            if let Some(t) = quad_cusp(p0, c, p2) {
                // the curve stops and turns back: two lines meeting in a round join
                let m = quad_eval(p0, c, p2, t);
                log::trace!("stroke: quad cusp split at ({}, {})", m.x, m.y);
                self.add_line(p0, m);
                if !coincident(m, p2) {
                    let forced = !self.pieces.is_empty();
                    self.push(Piece::Line(m, p2), forced);
                }
            } else {
                self.add_line(p0, p2);
            }
            return;
        }

        let t0 = d0.unit();
        let t1 = d1.unit();
        if t0.dot(t1) < COS_PI_8 && depth < MAX_QUAD_DEPTH {
            let (l, r) = quad_split(p0, c, p2, 0.5);
            self.add_quad(l[0], l[1], l[2], depth + 1);
            self.add_quad(r[0], r[1], r[2], depth + 1);
            return;
        }
        self.push(Piece::Quad(p0, c, p2), false);
    }

    /// The corner flags for the pieces traversed backwards.
    fn reversed_round(&self) -> Vec<bool> {
        let n = self.round.len();
        (0..n).map(|k| self.round[(n - k) % n]).collect()
    }
}

/// Split `path` into contours of pieces, approximating curves within
/// `tolerance`.
fn build_contours(path: &Path, tolerance: f64) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut cur: Option<Contour> = None;
    let mut last = Point::ORIGIN;

    for seg in path.segments() {
        if let PathSegment::MoveTo(p) = seg {
            contours.extend(cur.take());
            cur = Some(Contour::new(p));
            last = p;
            continue;
        }
        let contour = cur.get_or_insert_with(|| Contour::new(last));
        match seg {
            PathSegment::MoveTo(_) => {}
            PathSegment::LineTo(p) => {
                contour.add_line(last, p);
                last = p;
            }
            PathSegment::QuadTo(c, p) => {
                contour.add_quad(last, c, p, 0);
                last = p;
            }
            PathSegment::ConicTo(c, p, w) => {
                for q in Conic::new(last, c, p, w).to_quads(tolerance) {
                    contour.add_quad(q[0], q[1], q[2], 0);
                }
                last = p;
            }
            PathSegment::CubicTo(c1, c2, p) => {
                for q in cubic_to_quads([last, c1, c2, p], tolerance) {
                    contour.add_quad(q[0], q[1], q[2], 0);
                }
                last = p;
            }
            PathSegment::Close => {
                let start = contour.start;
                if !coincident(last, start) {
                    contour.add_line(last, start);
                }
                contour.closed = true;
                last = start;
                contours.extend(cur.take());
            }
        }
    }
    contours.extend(cur);
    contours
}

// ============================================================================
// Stroker
// ============================================================================

/// Stroke outline generator.
///
/// Holds the stroke geometry settings and an optional dash pattern, and
/// produces outline paths ready to be filled with the non-zero rule.
#[derive(Debug, Clone)]
pub struct Stroker {
    math: MathStroke,
    dash: Option<DashPattern>,
}

impl Stroker {
    pub fn new() -> Self {
        Self { math: MathStroke::new(), dash: None }
    }

    pub fn from_style(style: &StrokeStyle) -> Self {
        let mut s = Self::new();
        s.set_width(style.width);
        s.set_line_join(style.join);
        s.set_line_cap(style.cap);
        s.set_miter_limit(style.miter_limit);
        s.set_dash(style.dash.clone());
        s
    }

    // Parameter forwarding to MathStroke
    pub fn set_line_cap(&mut self, lc: LineCap) {
        self.math.set_line_cap(lc);
    }
    pub fn line_cap(&self) -> LineCap {
        self.math.line_cap()
    }

    pub fn set_line_join(&mut self, lj: LineJoin) {
        self.math.set_line_join(lj);
    }
    pub fn line_join(&self) -> LineJoin {
        self.math.line_join()
    }

    pub fn set_inner_join(&mut self, ij: InnerJoin) {
        self.math.set_inner_join(ij);
    }
    pub fn inner_join(&self) -> InnerJoin {
        self.math.inner_join()
    }

    pub fn set_width(&mut self, w: f64) {
        self.math.set_width(w);
    }
    pub fn width(&self) -> f64 {
        self.math.width()
    }

    pub fn set_miter_limit(&mut self, ml: f64) {
        self.math.set_miter_limit(ml);
    }
    pub fn miter_limit(&self) -> f64 {
        self.math.miter_limit()
    }

    pub fn set_miter_limit_theta(&mut self, t: f64) {
        self.math.set_miter_limit_theta(t);
    }

    /// Device units per path unit; curves and round geometry get finer as
    /// it grows.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.math.set_approximation_scale(s);
    }
    pub fn approximation_scale(&self) -> f64 {
        self.math.approximation_scale()
    }

    pub fn set_dash(&mut self, dash: Option<DashPattern>) {
        self.dash = dash;
    }
    pub fn dash(&self) -> Option<&DashPattern> {
        self.dash.as_ref()
    }

    fn tolerance(&self) -> f64 {
        let s = self.math.approximation_scale();
        if s > 0.0 && s.is_finite() {
            0.25 / s
        } else {
            0.25
        }
    }

    // ------------------------------------------------------------------------
    // Outlines
    // ------------------------------------------------------------------------

    /// Outline of `path` stroked with the current settings.
    pub fn stroke(&self, path: &Path) -> Path {
        let mut out = Path::new();
        self.stroke_into(path, &mut out);
        out
    }

    /// Append the outline of `path` to `out`.
    pub fn stroke_into(&self, path: &Path, out: &mut Path) {
        let dashed;
        let center = match &self.dash {
            Some(d) if d.is_active() => {
                dashed = dash_path(path, d, self.math.approximation_scale());
                &dashed
            }
            _ => path,
        };

        let hw = self.math.half_width();
        let before = out.len();
        let contours = build_contours(center, self.tolerance());
        for c in &contours {
            if c.pieces.is_empty() {
                if c.drawn {
                    self.math.calc_dot(out, c.start);
                }
                continue;
            }
            if hw <= 0.0 {
                continue;
            }
            let reversed: Vec<Piece> = c.pieces.iter().rev().map(Piece::reversed).collect();
            let round_rev = c.reversed_round();
            if c.closed {
                self.rail(out, &self.math, &c.pieces, &c.round, hw, true, true);
                self.rail(out, &self.math, &reversed, &round_rev, hw, true, true);
            } else {
                self.rail(out, &self.math, &c.pieces, &c.round, hw, false, true);
                let last = c.pieces[c.pieces.len() - 1];
                self.math.calc_cap(out, last.end(), last.end_tangent());
                self.rail(out, &self.math, &reversed, &round_rev, hw, false, false);
                let first = c.pieces[0];
                self.math.calc_cap(out, first.start(), -first.start_tangent());
                out.close();
            }
        }
        log::debug!(
            "stroke: {} contours -> {} commands",
            contours.len(),
            out.len() - before
        );
    }

    /// One offset contour per closed subpath of `path`, moved `distance`
    /// outward for counter-clockwise (y-up) contours. Open subpaths are
    /// ignored. Inner corners meet at the rails' intersection where it
    /// exists.
    pub fn offset(&self, path: &Path, distance: f64) -> Path {
        let mut out = Path::new();
        let mut math = self.math;
        math.set_inner_join(InnerJoin::Jag);
        let d = -distance;
        for c in build_contours(path, self.tolerance()) {
            if !c.closed || c.pieces.is_empty() {
                continue;
            }
            self.rail(&mut out, &math, &c.pieces, &c.round, d, true, true);
        }
        out
    }

    /// Emit the rail `d` to the left of `pieces`, joining consecutive
    /// pieces. A closed rail also joins the last piece to the first and is
    /// closed. With `start`, the rail begins with a move; otherwise it
    /// continues from the current point.
    #[allow(clippy::too_many_arguments)]
    fn rail(
        &self,
        out: &mut Path,
        math: &MathStroke,
        pieces: &[Piece],
        round: &[bool],
        d: f64,
        closed: bool,
        start: bool,
    ) {
        let n = pieces.len();
        let first = pieces[0].offset(d).start();
        if start {
            out.move_to(first.x, first.y);
        } else if out.current_point().map_or(true, |p| !coincident(p, first)) {
            out.line_to(first.x, first.y);
        }

        let mut round_math = *math;
        round_math.set_line_join(LineJoin::Round);

        for i in 0..n {
            let piece = pieces[i];
            piece.offset(d).emit(out);
            if i + 1 == n && !closed {
                break;
            }
            let j = (i + 1) % n;
            let next = pieces[j];
            let m = if round[j] { &round_math } else { math };
            m.calc_join(
                out,
                piece.end(),
                piece.end_tangent(),
                next.start_tangent(),
                piece.chord(),
                next.chord(),
                d,
            );
            let next_start = next.offset(d).start();
            if out.current_point().map_or(true, |p| !coincident(p, next_start)) {
                out.line_to(next_start.x, next_start.y);
            }
        }
        if closed {
            out.close();
        }
    }
}

impl Default for Stroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Outline of `path` stroked with `style`.
pub fn stroke_path(path: &Path, style: &StrokeStyle) -> Path {
    Stroker::from_style(style).stroke(path)
}

// ============================================================================
// Tests
// ============================================================================
