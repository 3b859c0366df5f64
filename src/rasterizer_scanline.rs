//! Scanline polygon rasterizer.
//!
//! Accepts polygon contours (move_to / line_to / close) in double
//! coordinates, converts them to 24.8 fixed-point edges, and sweeps the
//! edge table one pixel row at a time. Each row is sampled at its vertical
//! center; active edges advance with an integer error-accumulating stepper,
//! so no division happens inside the sweep. Crossings are accumulated left
//! to right and every pixel whose center lies inside under the filling rule
//! gets full coverage in a one-row mask, which is handed to a
//! `PixelFormat` once per row and cleared as it is consumed.
//!
//! Output is deterministic: the same contours always produce the same
//! pixels, independent of contour order.

use crate::array::{insertion_sort, quick_sort};
use crate::basics::{
    ifloor, is_close, is_move_to, is_stop, is_vertex, iceil, CoverType, FillingRule, RectI,
    VertexSource, COVER_FULL, COVER_NONE, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT,
};
use crate::rasterizer_sl_clip::{poly_coord, LineSink, RasterizerSlClip};

const HALF_PIXEL: i32 = (POLY_SUBPIXEL_SCALE / 2) as i32;

/// First pixel (row or column) whose center is at or after the 24.8
/// position `v`.
#[inline]
fn pixel_at_or_after(v: i64) -> i64 {
    (v + HALF_PIXEL as i64 - 1) >> POLY_SUBPIXEL_SHIFT
}

// ============================================================================
// Edge
// ============================================================================

/// A polyline segment in 24.8 fixed point with `y0 < y1`.
///
/// `sign` is `+1` when the original segment ran toward increasing y and
/// `-1` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub sign: i32,
}

impl Edge {
    /// Normalized edge, or `None` for an exactly horizontal segment.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Edge> {
        if y1 == y2 {
            return None;
        }
        Some(if y1 < y2 {
            Edge { x0: x1, y0: y1, x1: x2, y1: y2, sign: 1 }
        } else {
            Edge { x0: x2, y0: y2, x1: x1, y1: y1, sign: -1 }
        })
    }

    /// First pixel row whose center the edge crosses.
    #[inline]
    pub fn first_row(&self) -> i32 {
        pixel_at_or_after(self.y0 as i64) as i32
    }

    /// One past the last pixel row whose center the edge crosses.
    #[inline]
    pub fn end_row(&self) -> i32 {
        pixel_at_or_after(self.y1 as i64) as i32
    }
}

// ============================================================================
// ActiveEdge
// ============================================================================

/// An edge crossing the current row, with a Bresenham-style x stepper.
///
/// The exact crossing is `x + d / d0` in 24.8 units with `0 <= d < d0`.
/// Each row advances `x` by `inc` and `d` by `m0`, carrying into `x`
/// when `d` reaches `d0`.
#[derive(Debug, Clone, Copy)]
pub struct ActiveEdge {
    pub x: i64,
    pub d: i64,
    pub d0: i64,
    pub m0: i64,
    pub inc: i64,
    pub sign: i32,
    pub end_row: i32,
}

impl ActiveEdge {
    /// Activate `edge` at pixel row `row`.
    pub fn new(edge: &Edge, row: i32) -> Self {
        let dx = edge.x1 as i64 - edge.x0 as i64;
        let dy = edge.y1 as i64 - edge.y0 as i64;
        let sample = ((row as i64) << POLY_SUBPIXEL_SHIFT) + HALF_PIXEL as i64;
        let num = (sample - edge.y0 as i64) * dx;
        let step = dx << POLY_SUBPIXEL_SHIFT;
        Self {
            x: edge.x0 as i64 + num.div_euclid(dy),
            d: num.rem_euclid(dy),
            d0: dy,
            m0: step.rem_euclid(dy),
            inc: step.div_euclid(dy),
            sign: edge.sign,
            end_row: edge.end_row(),
        }
    }

    /// Advance to the next row.
    #[inline]
    pub fn step(&mut self) {
        self.x += self.inc;
        self.d += self.m0;
        if self.d >= self.d0 {
            self.d -= self.d0;
            self.x += 1;
        }
    }

    /// The crossing rounded up to the next 24.8 unit.
    #[inline]
    pub fn x_ceil(&self) -> i64 {
        self.x + (self.d > 0) as i64
    }
}

// ============================================================================
// Edge table
// ============================================================================

#[derive(Debug, Default)]
struct EdgeTable {
    edges: Vec<Edge>,
    horizontal: usize,
}

impl LineSink for EdgeTable {
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        match Edge::new(x1, y1, x2, y2) {
            Some(e) => self.edges.push(e),
            None => self.horizontal += 1,
        }
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Scanline polygon rasterizer.
///
/// Usage:
/// 1. Optionally set `set_filling_rule()` and `set_clip_box()`
/// 2. Define contours with `move_to_d()` / `line_to_d()` or `add_path()`
/// 3. Call `render()` to paint into a `PixelFormat`
///
/// Contours are closed implicitly.
pub struct Rasterizer {
    table: EdgeTable,
    clipper: RasterizerSlClip,
    clip_px: Option<RectI>,
    filling_rule: FillingRule,
    start_x: i32,
    start_y: i32,
    status: Status,
    sorted: bool,
    active: Vec<ActiveEdge>,
    mask: Vec<CoverType>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            table: EdgeTable::default(),
            clipper: RasterizerSlClip::new(),
            clip_px: None,
            filling_rule: FillingRule::NonZero,
            start_x: 0,
            start_y: 0,
            status: Status::Initial,
            sorted: false,
            active: Vec::new(),
            mask: Vec::new(),
        }
    }

    /// Discard all contours. Buffers keep their capacity.
    pub fn reset(&mut self) {
        self.table.edges.clear();
        self.table.horizontal = 0;
        self.status = Status::Initial;
        self.sorted = false;
    }

    pub fn set_filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    pub fn filling_rule(&self) -> FillingRule {
        self.filling_rule
    }

    /// Restrict output to the pixel box `[x1, x2) x [y1, y2)`.
    pub fn set_clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.reset();
        self.clipper.clip_box(poly_coord(x1), poly_coord(y1), poly_coord(x2), poly_coord(y2));
        let mut r = RectI::new(ifloor(x1), ifloor(y1), iceil(x2), iceil(y2));
        r.normalize();
        self.clip_px = Some(r);
    }

    pub fn reset_clipping(&mut self) {
        self.reset();
        self.clipper.reset_clipping();
        self.clip_px = None;
    }

    /// Number of non-horizontal edges collected so far.
    pub fn num_edges(&self) -> usize {
        self.table.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.table.edges
    }

    // ------------------------------------------------------------------------
    // Path building
    // ------------------------------------------------------------------------

    /// Close the current contour back to its start point.
    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.clipper.line_to(&mut self.table, self.start_x, self.start_y);
            self.status = Status::Closed;
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        if self.sorted {
            self.reset();
        }
        self.close_polygon();
        self.start_x = poly_coord(x);
        self.start_y = poly_coord(y);
        self.clipper.move_to(self.start_x, self.start_y);
        self.status = Status::MoveTo;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        if self.status == Status::Initial || self.sorted {
            self.move_to_d(x, y);
            return;
        }
        self.clipper.line_to_d(&mut self.table, x, y);
        self.status = Status::LineTo;
    }

    /// Add a vertex (dispatches to move_to, line_to, or close based on command).
    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        if is_move_to(cmd) {
            self.move_to_d(x, y);
        } else if is_vertex(cmd) {
            self.line_to_d(x, y);
        } else if is_close(cmd) {
            self.close_polygon();
        }
    }

    /// Add all vertices from a vertex source.
    pub fn add_path(&mut self, vs: &mut dyn VertexSource, path_id: u32) {
        let mut x = 0.0;
        let mut y = 0.0;

        vs.rewind(path_id);
        if self.sorted {
            self.reset();
        }
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            self.add_vertex(x, y, cmd);
        }
    }

    fn sort(&mut self) {
        self.close_polygon();
        if !self.sorted {
            quick_sort(&mut self.table.edges, &|a: &Edge, b: &Edge| {
                (a.y0, a.x0, a.y1, a.x1) < (b.y0, b.x0, b.y1, b.x1)
            });
            self.sorted = true;
        }
    }

    // ------------------------------------------------------------------------
    // Scanline sweep
    // ------------------------------------------------------------------------

    /// Paint every contour added so far into `pf` with color `c`.
    ///
    /// Returns the number of pixels given coverage.
    pub fn render<P: crate::pixfmt_rgba::PixelFormat>(&mut self, pf: &mut P, c: &P::ColorType) -> usize {
        self.sort();

        let mut x_lo = 0i32;
        let mut y_lo = 0i32;
        let mut x_hi = pf.width() as i32;
        let mut y_hi = pf.height() as i32;
        if let Some(r) = self.clip_px {
            x_lo = x_lo.max(r.x1);
            y_lo = y_lo.max(r.y1);
            x_hi = x_hi.min(r.x2);
            y_hi = y_hi.min(r.y2);
        }
        if self.table.edges.is_empty() || x_lo >= x_hi || y_lo >= y_hi {
            return 0;
        }

        self.mask.clear();
        self.mask.resize(pf.width() as usize, COVER_NONE);
        self.active.clear();

        let edges = &self.table.edges;
        let end_row = edges.iter().map(Edge::end_row).max().unwrap_or(0).min(y_hi);
        let mut row = edges[0].first_row().max(y_lo);
        let mut next = 0usize;
        let mut painted = 0usize;
        let mut rows = 0usize;

        while row < end_row {
            // activate
            while next < edges.len() && edges[next].first_row() <= row {
                let e = &edges[next];
                if e.end_row() > row {
                    self.active.push(ActiveEdge::new(e, row));
                }
                next += 1;
            }
            if self.active.is_empty() {
                if next >= edges.len() {
                    break;
                }
                row = edges[next].first_row();
                continue;
            }

            insertion_sort(&mut self.active, &|a: &ActiveEdge, b: &ActiveEdge| {
                a.x_ceil() < b.x_ceil()
            });

            // accumulate crossings
            let mut winding = 0;
            let mut first = i64::MAX;
            let mut last = i64::MIN;
            for pair in self.active.windows(2) {
                winding += pair[0].sign;
                if !self.filling_rule.is_inside(winding) {
                    continue;
                }
                let a = pixel_at_or_after(pair[0].x_ceil()).max(x_lo as i64);
                let b = pixel_at_or_after(pair[1].x_ceil()).min(x_hi as i64);
                if a < b {
                    for m in &mut self.mask[a as usize..b as usize] {
                        *m = COVER_FULL;
                    }
                    first = first.min(a);
                    last = last.max(b);
                }
            }

            if first < last {
                let span = &mut self.mask[first as usize..last as usize];
                painted += span.iter().filter(|&&m| m != COVER_NONE).count();
                pf.blend_solid_hspan(first as i32, row, c, span);
                span.fill(COVER_NONE);
                rows += 1;
            }

            // retire and step
            let next_row = row + 1;
            self.active.retain(|e| e.end_row > next_row);
            for e in &mut self.active {
                e.step();
            }
            row = next_row;
        }

        log::debug!(
            "rasterized {} edges ({} horizontal dropped): {} rows, {} pixels",
            edges.len(),
            self.table.horizontal,
            rows,
            painted
        );
        painted
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
