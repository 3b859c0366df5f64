//! Path storage: the command/point data model every stage consumes.
//!
//! A `Path` keeps three parallel buffers: commands, the points those commands
//! consume (a fixed number per command), and one weight per conic. Builder
//! calls only ever append, so reading the buffers back reproduces exactly
//! what was written.

use crate::basics::RectD;
use crate::point::{Point, Vector};

/// Conic weight of a quarter circle arc, `cos(π/4)`.
pub const QUARTER_ARC_WEIGHT: f64 = std::f64::consts::FRAC_1_SQRT_2;

// ============================================================================
// Commands and segments
// ============================================================================

/// A path command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathCmd {
    Move,
    Line,
    Quad,
    Conic,
    Cubic,
    Close,
}

impl PathCmd {
    /// Number of points this command consumes from the point buffer.
    #[inline]
    pub fn point_count(self) -> usize {
        match self {
            PathCmd::Move | PathCmd::Line => 1,
            PathCmd::Quad | PathCmd::Conic => 2,
            PathCmd::Cubic => 3,
            PathCmd::Close => 0,
        }
    }
}

/// One command together with its absolute points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    ConicTo(Point, Point, f64),
    CubicTo(Point, Point, Point),
    Close,
}

impl PathSegment {
    /// End point of a drawing segment (or the target of a move).
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathSegment::MoveTo(p)
            | PathSegment::LineTo(p)
            | PathSegment::QuadTo(_, p)
            | PathSegment::ConicTo(_, p, _)
            | PathSegment::CubicTo(_, _, p) => Some(p),
            PathSegment::Close => None,
        }
    }

    /// The same curve traversed backwards, ending at `from` (where it began).
    fn reversed_from(&self, from: Point) -> PathSegment {
        match *self {
            PathSegment::LineTo(_) => PathSegment::LineTo(from),
            PathSegment::QuadTo(c, _) => PathSegment::QuadTo(c, from),
            PathSegment::ConicTo(c, _, w) => PathSegment::ConicTo(c, from, w),
            PathSegment::CubicTo(c1, c2, _) => PathSegment::CubicTo(c2, c1, from),
            other => other,
        }
    }
}

// ============================================================================
// Path
// ============================================================================

/// An ordered sequence of subpaths built from move/line/quad/conic/cubic/close
/// commands.
///
/// Invariants kept by the builder: every subpath begins with a move, no two
/// moves are adjacent (a second move replaces the first), and close never
/// duplicates the subpath's start point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cmds: Vec<PathCmd>,
    points: Vec<Point>,
    weights: Vec<f64>,
    // index into `points` of the current subpath's move
    start: usize,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty path with room for `cmds` commands and `points` points.
    pub fn with_capacity(cmds: usize, points: usize) -> Self {
        Self {
            cmds: Vec::with_capacity(cmds),
            points: Vec::with_capacity(points),
            weights: Vec::new(),
            start: 0,
        }
    }

    /// Remove everything, keeping allocated memory.
    pub fn clear(&mut self) {
        self.cmds.clear();
        self.points.clear();
        self.weights.clear();
        self.start = 0;
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Begin a new subpath at (x, y).
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = Point::new(x, y);
        if self.last_command() == Some(PathCmd::Move) {
            if let Some(last) = self.points.last_mut() {
                *last = p;
            }
            return;
        }
        self.start = self.points.len();
        self.cmds.push(PathCmd::Move);
        self.points.push(p);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.inject_move();
        self.cmds.push(PathCmd::Line);
        self.points.push(Point::new(x, y));
    }

    pub fn quad_to(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.inject_move();
        self.cmds.push(PathCmd::Quad);
        self.points.push(Point::new(x_ctrl, y_ctrl));
        self.points.push(Point::new(x_to, y_to));
    }

    /// Rational quadratic with weight `w` on the control point.
    pub fn conic_to(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64, w: f64) {
        self.inject_move();
        self.cmds.push(PathCmd::Conic);
        self.points.push(Point::new(x_ctrl, y_ctrl));
        self.points.push(Point::new(x_to, y_to));
        self.weights.push(w);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cubic_to(
        &mut self,
        x_ctrl1: f64,
        y_ctrl1: f64,
        x_ctrl2: f64,
        y_ctrl2: f64,
        x_to: f64,
        y_to: f64,
    ) {
        self.inject_move();
        self.cmds.push(PathCmd::Cubic);
        self.points.push(Point::new(x_ctrl1, y_ctrl1));
        self.points.push(Point::new(x_ctrl2, y_ctrl2));
        self.points.push(Point::new(x_to, y_to));
    }

    /// Close the current subpath. No-op if there is no open subpath.
    pub fn close(&mut self) {
        match self.last_command() {
            None | Some(PathCmd::Close) => {}
            _ => self.cmds.push(PathCmd::Close),
        }
    }

    /// Append one segment record.
    pub fn push(&mut self, seg: PathSegment) {
        match seg {
            PathSegment::MoveTo(p) => self.move_to(p.x, p.y),
            PathSegment::LineTo(p) => self.line_to(p.x, p.y),
            PathSegment::QuadTo(c, p) => self.quad_to(c.x, c.y, p.x, p.y),
            PathSegment::ConicTo(c, p, w) => self.conic_to(c.x, c.y, p.x, p.y, w),
            PathSegment::CubicTo(c1, c2, p) => self.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathSegment::Close => self.close(),
        }
    }

    /// Drawing after a close continues from the closed subpath's start;
    /// drawing on an empty path starts at the origin.
    fn inject_move(&mut self) {
        match self.last_command() {
            None => self.move_to(0.0, 0.0),
            Some(PathCmd::Close) => {
                let p = self.points[self.start];
                self.move_to(p.x, p.y);
            }
            _ => {}
        }
    }

    // ---------------------------------------------------------------
    // Convenience shapes
    // ---------------------------------------------------------------

    /// Closed axis-aligned rectangle, counter-clockwise in y-up coordinates.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close();
    }

    /// Closed circle made of four conic quarter arcs.
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64) {
        let w = QUARTER_ARC_WEIGHT;
        self.move_to(cx + r, cy);
        self.conic_to(cx + r, cy + r, cx, cy + r, w);
        self.conic_to(cx - r, cy + r, cx - r, cy, w);
        self.conic_to(cx - r, cy - r, cx, cy - r, w);
        self.conic_to(cx + r, cy - r, cx + r, cy, w);
        self.close();
    }

    /// Polyline through `pts`, optionally closed.
    pub fn polygon(&mut self, pts: &[Point], closed: bool) {
        let Some((first, rest)) = pts.split_first() else {
            return;
        };
        self.move_to(first.x, first.y);
        for p in rest {
            self.line_to(p.x, p.y);
        }
        if closed {
            self.close();
        }
    }

    /// Append all subpaths of `other`.
    pub fn append(&mut self, other: &Path) {
        for seg in other.segments() {
            self.push(seg);
        }
    }

    /// Append `other` traversed backwards. With `connect`, the reversed path's
    /// first move becomes a line from the current point.
    pub fn append_reversed(&mut self, other: &Path, connect: bool) {
        let segs: Vec<PathSegment> = other.segments().collect();
        let mut first = connect && !self.is_empty();
        for seg in reverse_segments(&segs) {
            match seg {
                PathSegment::MoveTo(p) if first => {
                    self.line_to(p.x, p.y);
                    first = false;
                }
                seg => self.push(seg),
            }
        }
    }

    // ---------------------------------------------------------------
    // Transforms
    // ---------------------------------------------------------------

    /// Apply `f` to every stored point (weights are affine invariant).
    pub fn map_points<F: FnMut(Point) -> Point>(&mut self, mut f: F) {
        for p in self.points.iter_mut() {
            *p = f(*p);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let v = Vector::new(dx, dy);
        self.map_points(|p| p + v);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.map_points(|p| Point::new(p.x * sx, p.y * sy));
    }

    /// The whole path traversed backwards, subpath by subpath.
    pub fn reversed(&self) -> Path {
        let segs: Vec<PathSegment> = self.segments().collect();
        reverse_segments(&segs).into_iter().collect()
    }

    // ---------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------

    pub fn commands(&self) -> &[PathCmd] {
        &self.cmds
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn last_command(&self) -> Option<PathCmd> {
        self.cmds.last().copied()
    }

    /// The point the next drawing command would start from.
    pub fn current_point(&self) -> Option<Point> {
        match self.last_command()? {
            PathCmd::Close => Some(self.points[self.start]),
            _ => self.points.last().copied(),
        }
    }

    /// Iterate commands together with their points.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            path: self,
            cmd: 0,
            pt: 0,
            wt: 0,
        }
    }

    /// Bounding box of all stored points (control points included).
    pub fn bounds(&self) -> Option<RectD> {
        let first = self.points.first()?;
        let mut r = RectD::new(first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            r.x1 = r.x1.min(p.x);
            r.y1 = r.y1.min(p.y);
            r.x2 = r.x2.max(p.x);
            r.y2 = r.y2.max(p.y);
        }
        Some(r)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        let mut path = Path::new();
        for seg in iter {
            path.push(seg);
        }
        path
    }
}

/// Iterator over the segments of a [`Path`].
pub struct Segments<'a> {
    path: &'a Path,
    cmd: usize,
    pt: usize,
    wt: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = PathSegment;

    fn next(&mut self) -> Option<PathSegment> {
        let cmd = *self.path.cmds.get(self.cmd)?;
        self.cmd += 1;
        let pts = &self.path.points[self.pt..];
        let seg = match cmd {
            PathCmd::Move => PathSegment::MoveTo(pts[0]),
            PathCmd::Line => PathSegment::LineTo(pts[0]),
            PathCmd::Quad => PathSegment::QuadTo(pts[0], pts[1]),
            PathCmd::Conic => {
                let w = self.path.weights[self.wt];
                self.wt += 1;
                PathSegment::ConicTo(pts[0], pts[1], w)
            }
            PathCmd::Cubic => PathSegment::CubicTo(pts[0], pts[1], pts[2]),
            PathCmd::Close => PathSegment::Close,
        };
        self.pt += cmd.point_count();
        Some(seg)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.path.cmds.len() - self.cmd;
        (n, Some(n))
    }
}

// ============================================================================
// Reversal
// ============================================================================

/// Reverse each subpath of a segment sequence.
///
/// Closed subpaths keep their start point: the close edge becomes the first
/// drawn edge and a trailing close is emitted. Open subpaths start from their
/// old end point. A fragment that does not begin with a move starts at the
/// end point of its first segment.
pub fn reverse_segments(segs: &[PathSegment]) -> Vec<PathSegment> {
    let mut out = Vec::with_capacity(segs.len() + 2);
    let mut i = 0;
    while i < segs.len() {
        let (start, body_from) = match segs[i] {
            PathSegment::MoveTo(p) => (p, i + 1),
            PathSegment::Close => {
                i += 1;
                continue;
            }
            seg => (seg.end_point().unwrap_or(Point::ORIGIN), i + 1),
        };
        let mut j = body_from;
        while j < segs.len() && !matches!(segs[j], PathSegment::MoveTo(_) | PathSegment::Close) {
            j += 1;
        }
        let closed = j < segs.len() && segs[j] == PathSegment::Close;
        reverse_subpath(start, &segs[body_from..j], closed, &mut out);
        i = if closed { j + 1 } else { j };
    }
    out
}

fn reverse_subpath(start: Point, body: &[PathSegment], closed: bool, out: &mut Vec<PathSegment>) {
    let mut begins = Vec::with_capacity(body.len());
    let mut cur = start;
    for seg in body {
        begins.push(cur);
        if let Some(p) = seg.end_point() {
            cur = p;
        }
    }
    let end = cur;

    if closed {
        out.push(PathSegment::MoveTo(start));
        if end != start {
            out.push(PathSegment::LineTo(end));
        }
        for (k, seg) in body.iter().enumerate().rev() {
            let rev = seg.reversed_from(begins[k]);
            // the final line back to the start is implied by the close
            if k == 0 && matches!(rev, PathSegment::LineTo(_)) {
                continue;
            }
            out.push(rev);
        }
        out.push(PathSegment::Close);
    } else {
        out.push(PathSegment::MoveTo(end));
        for (k, seg) in body.iter().enumerate().rev() {
            out.push(seg.reversed_from(begins[k]));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
