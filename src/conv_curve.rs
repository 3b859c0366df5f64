//! Curve flattening converter.
//!
//! `ConvCurve` walks a [`Path`] as a `VertexSource`, replacing quadratic,
//! conic and cubic segments with `line_to` runs from the incremental curve
//! generators. `flatten` collects the same output into polylines, which is
//! the form the clipper, the mesh builder and the dasher consume.

use crate::basics::{
    VertexSource, PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP,
    PATH_FLAGS_CLOSE,
};
use crate::curves::{ConicInc, Curve3Inc, Curve4Inc};
use crate::path_storage::{Path, PathSegment, Segments};
use crate::point::Point;

// ============================================================================
// ConvCurve
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Pending {
    None,
    Curve3,
    Curve4,
    Conic,
}

/// Curve flattening converter over a path.
///
/// Emits `MOVE_TO`, then `LINE_TO` for every line and every curve step, and
/// `END_POLY | CLOSE` for a close command.
pub struct ConvCurve<'a> {
    path: &'a Path,
    segments: Segments<'a>,
    last: Point,
    start: Point,
    pending: Pending,
    curve3: Curve3Inc,
    curve4: Curve4Inc,
    conic: ConicInc,
}

impl<'a> ConvCurve<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self {
            path,
            segments: path.segments(),
            last: Point::ORIGIN,
            start: Point::ORIGIN,
            pending: Pending::None,
            curve3: Curve3Inc::new(),
            curve4: Curve4Inc::new(),
            conic: ConicInc::new(),
        }
    }

    /// Scale factor from path units to device pixels; more pixels per unit
    /// means more steps per curve.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.curve3.set_approximation_scale(s);
        self.curve4.set_approximation_scale(s);
        self.conic.set_approximation_scale(s);
    }

    pub fn approximation_scale(&self) -> f64 {
        self.curve4.approximation_scale()
    }

    fn pull_pending(&mut self, x: &mut f64, y: &mut f64) -> bool {
        let cmd = match self.pending {
            Pending::None => return false,
            Pending::Curve3 => self.curve3.vertex(x, y),
            Pending::Curve4 => self.curve4.vertex(x, y),
            Pending::Conic => self.conic.vertex(x, y),
        };
        if cmd == PATH_CMD_STOP {
            self.pending = Pending::None;
            return false;
        }
        true
    }

    fn start_curve(&mut self, kind: Pending, x: &mut f64, y: &mut f64) -> u32 {
        self.pending = kind;
        // the generator's first vertex repeats the current point
        let (mut sx, mut sy) = (0.0, 0.0);
        self.pull_pending(&mut sx, &mut sy);
        if self.pull_pending(x, y) {
            self.last = Point::new(*x, *y);
        }
        PATH_CMD_LINE_TO
    }
}

impl VertexSource for ConvCurve<'_> {
    fn rewind(&mut self, _path_id: u32) {
        self.segments = self.path.segments();
        self.last = Point::ORIGIN;
        self.start = Point::ORIGIN;
        self.pending = Pending::None;
        self.curve3.reset();
        self.curve4.reset();
        self.conic.reset();
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.pull_pending(x, y) {
            self.last = Point::new(*x, *y);
            return PATH_CMD_LINE_TO;
        }

        let Some(seg) = self.segments.next() else {
            return PATH_CMD_STOP;
        };

        match seg {
            PathSegment::MoveTo(p) => {
                self.start = p;
                self.last = p;
                *x = p.x;
                *y = p.y;
                PATH_CMD_MOVE_TO
            }
            PathSegment::LineTo(p) => {
                self.last = p;
                *x = p.x;
                *y = p.y;
                PATH_CMD_LINE_TO
            }
            PathSegment::QuadTo(c, p) => {
                self.curve3.init(self.last, c, p);
                self.start_curve(Pending::Curve3, x, y)
            }
            PathSegment::ConicTo(c, p, w) => {
                self.conic.init(self.last, c, p, w);
                self.start_curve(Pending::Conic, x, y)
            }
            PathSegment::CubicTo(c1, c2, p) => {
                self.curve4.init(self.last, c1, c2, p);
                self.start_curve(Pending::Curve4, x, y)
            }
            PathSegment::Close => {
                self.last = self.start;
                *x = 0.0;
                *y = 0.0;
                PATH_CMD_END_POLY | PATH_FLAGS_CLOSE
            }
        }
    }
}

// ============================================================================
// Polylines
// ============================================================================

/// One flattened subpath.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Flatten every subpath of `path` into a polyline. Consecutive duplicate
/// points are dropped; a closed polyline does not repeat its first point.
pub fn flatten(path: &Path, approximation_scale: f64) -> Vec<Polyline> {
    let mut conv = ConvCurve::new(path);
    conv.set_approximation_scale(approximation_scale);
    let mut out: Vec<Polyline> = Vec::new();
    let mut cur = Polyline::default();

    let (mut x, mut y) = (0.0, 0.0);
    loop {
        let cmd = conv.vertex(&mut x, &mut y);
        if cmd == PATH_CMD_STOP {
            break;
        }
        if cmd == PATH_CMD_MOVE_TO {
            finish_polyline(&mut cur, &mut out);
            cur.points.push(Point::new(x, y));
        } else if cmd == PATH_CMD_LINE_TO {
            let p = Point::new(x, y);
            if cur.points.last() != Some(&p) {
                cur.points.push(p);
            }
        } else {
            cur.closed = true;
            finish_polyline(&mut cur, &mut out);
        }
    }
    finish_polyline(&mut cur, &mut out);
    out
}

fn finish_polyline(cur: &mut Polyline, out: &mut Vec<Polyline>) {
    if cur.closed && cur.points.len() > 1 && cur.points.first() == cur.points.last() {
        cur.points.pop();
    }
    if cur.points.is_empty() {
        cur.closed = false;
    } else {
        out.push(std::mem::take(cur));
    }
}

// ============================================================================
// Tests
// ============================================================================
