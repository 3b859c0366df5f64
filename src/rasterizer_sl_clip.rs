//! Rasterizer clipping: double to 24.8 fixed-point conversion and clip-box
//! line clipping.
//!
//! Segments are clipped against the box in fixed point before they reach
//! the edge table. Parts that leave the box above or below are dropped;
//! parts left or right of it are clamped onto the box edge as vertical
//! runs, so the winding seen inside the box is unchanged.

use crate::basics::{iround, saturation_iround, Rect, POLY_MAX_COORD, POLY_SUBPIXEL_SCALE};

// ============================================================================
// Coordinate conversion
// ============================================================================

/// Largest representable 24.8 coordinate.
const MAX_SUBPIXEL: i32 = POLY_MAX_COORD * POLY_SUBPIXEL_SCALE as i32;

/// Convert double to 24.8 fixed-point, saturating at the coordinate range.
#[inline]
pub fn poly_coord(v: f64) -> i32 {
    if v.is_nan() {
        return 0;
    }
    saturation_iround(MAX_SUBPIXEL, v * POLY_SUBPIXEL_SCALE as f64)
}

/// Mul-div for integer coordinates: round(a * b / c).
#[inline]
fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    iround(a as f64 * b as f64 / c as f64)
}

// ============================================================================
// Clipping flags
// ============================================================================

// Bit layout: 1 = right of x2, 2 = below y2, 4 = left of x1, 8 = above y1.

#[inline]
fn clipping_flags(x: i32, y: i32, clip_box: &Rect<i32>) -> u32 {
    (x > clip_box.x2) as u32
        | (((y > clip_box.y2) as u32) << 1)
        | (((x < clip_box.x1) as u32) << 2)
        | (((y < clip_box.y1) as u32) << 3)
}

#[inline]
fn clipping_flags_y(y: i32, clip_box: &Rect<i32>) -> u32 {
    (((y > clip_box.y2) as u32) << 1) | (((y < clip_box.y1) as u32) << 3)
}

// ============================================================================
// LineSink
// ============================================================================

/// Receiver of clipped fixed-point line segments.
pub trait LineSink {
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32);
}

impl LineSink for Vec<(i32, i32, i32, i32)> {
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.push((x1, y1, x2, y2));
    }
}

// ============================================================================
// RasterizerSlClip
// ============================================================================

/// Clips polyline segments against a box in 24.8 coordinates and forwards
/// the visible parts to a `LineSink`.
#[derive(Debug, Clone)]
pub struct RasterizerSlClip {
    clip_box: Rect<i32>,
    x1: i32,
    y1: i32,
    f1: u32,
    clipping: bool,
}

impl RasterizerSlClip {
    pub fn new() -> Self {
        Self {
            clip_box: Rect::new(0, 0, 0, 0),
            x1: 0,
            y1: 0,
            f1: 0,
            clipping: false,
        }
    }

    /// Disable clipping.
    pub fn reset_clipping(&mut self) {
        self.clipping = false;
    }

    /// Set the clipping rectangle in 24.8 fixed-point coordinates.
    pub fn clip_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clip_box = Rect::new(x1, y1, x2, y2);
        self.clip_box.normalize();
        self.clipping = true;
    }

    pub fn clipping(&self) -> bool {
        self.clipping
    }

    pub fn move_to(&mut self, x1: i32, y1: i32) {
        self.x1 = x1;
        self.y1 = y1;
        if self.clipping {
            self.f1 = clipping_flags(x1, y1, &self.clip_box);
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.move_to(poly_coord(x), poly_coord(y));
    }

    /// Clip the segment from the current point to `(x2, y2)` and emit it.
    pub fn line_to<S: LineSink>(&mut self, sink: &mut S, x2: i32, y2: i32) {
        if self.clipping {
            let f2 = clipping_flags(x2, y2, &self.clip_box);

            // both ends beyond the same horizontal edge
            if (self.f1 & 10) == (f2 & 10) && (self.f1 & 10) != 0 {
                self.x1 = x2;
                self.y1 = y2;
                self.f1 = f2;
                return;
            }

            let (x1, y1, f1) = (self.x1, self.y1, self.f1);
            let cb = self.clip_box;

            match ((f1 & 5) << 1) | (f2 & 5) {
                0 => {
                    self.line_clip_y(sink, x1, y1, x2, y2, f1, f2);
                }
                1 => {
                    let y3 = y1 + mul_div(cb.x2 - x1, y2 - y1, x2 - x1);
                    let f3 = clipping_flags_y(y3, &cb);
                    self.line_clip_y(sink, x1, y1, cb.x2, y3, f1, f3);
                    self.line_clip_y(sink, cb.x2, y3, cb.x2, y2, f3, f2);
                }
                2 => {
                    let y3 = y1 + mul_div(cb.x2 - x1, y2 - y1, x2 - x1);
                    let f3 = clipping_flags_y(y3, &cb);
                    self.line_clip_y(sink, cb.x2, y1, cb.x2, y3, f1, f3);
                    self.line_clip_y(sink, cb.x2, y3, x2, y2, f3, f2);
                }
                3 => {
                    self.line_clip_y(sink, cb.x2, y1, cb.x2, y2, f1, f2);
                }
                4 => {
                    let y3 = y1 + mul_div(cb.x1 - x1, y2 - y1, x2 - x1);
                    let f3 = clipping_flags_y(y3, &cb);
                    self.line_clip_y(sink, x1, y1, cb.x1, y3, f1, f3);
                    self.line_clip_y(sink, cb.x1, y3, cb.x1, y2, f3, f2);
                }
                6 => {
                    let y3 = y1 + mul_div(cb.x2 - x1, y2 - y1, x2 - x1);
                    let y4 = y1 + mul_div(cb.x1 - x1, y2 - y1, x2 - x1);
                    let f3 = clipping_flags_y(y3, &cb);
                    let f4 = clipping_flags_y(y4, &cb);
                    self.line_clip_y(sink, cb.x2, y1, cb.x2, y3, f1, f3);
                    self.line_clip_y(sink, cb.x2, y3, cb.x1, y4, f3, f4);
                    self.line_clip_y(sink, cb.x1, y4, cb.x1, y2, f4, f2);
                }
                8 => {
                    let y3 = y1 + mul_div(cb.x1 - x1, y2 - y1, x2 - x1);
                    let f3 = clipping_flags_y(y3, &cb);
                    self.line_clip_y(sink, cb.x1, y1, cb.x1, y3, f1, f3);
                    self.line_clip_y(sink, cb.x1, y3, x2, y2, f3, f2);
                }
                9 => {
                    let y3 = y1 + mul_div(cb.x1 - x1, y2 - y1, x2 - x1);
                    let y4 = y1 + mul_div(cb.x2 - x1, y2 - y1, x2 - x1);
                    let f3 = clipping_flags_y(y3, &cb);
                    let f4 = clipping_flags_y(y4, &cb);
                    self.line_clip_y(sink, cb.x1, y1, cb.x1, y3, f1, f3);
                    self.line_clip_y(sink, cb.x1, y3, cb.x2, y4, f3, f4);
                    self.line_clip_y(sink, cb.x2, y4, cb.x2, y2, f4, f2);
                }
                12 => {
                    self.line_clip_y(sink, cb.x1, y1, cb.x1, y2, f1, f2);
                }
                // 5, 7, 10, 11: a point cannot be both left and right of the box
                _ => {}
            }
            self.f1 = f2;
        } else {
            sink.line(self.x1, self.y1, x2, y2);
        }
        self.x1 = x2;
        self.y1 = y2;
    }

    pub fn line_to_d<S: LineSink>(&mut self, sink: &mut S, x: f64, y: f64) {
        self.line_to(sink, poly_coord(x), poly_coord(y));
    }

    /// Clip a segment that is already inside the box horizontally.
    #[allow(clippy::too_many_arguments)]
    fn line_clip_y<S: LineSink>(
        &self,
        sink: &mut S,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        f1: u32,
        f2: u32,
    ) {
        let f1 = f1 & 10;
        let f2 = f2 & 10;

        if (f1 | f2) == 0 {
            sink.line(x1, y1, x2, y2);
        } else if f1 != f2 {
            let mut tx1 = x1;
            let mut ty1 = y1;
            let mut tx2 = x2;
            let mut ty2 = y2;

            if f1 & 8 != 0 {
                tx1 = x1 + mul_div(self.clip_box.y1 - y1, x2 - x1, y2 - y1);
                ty1 = self.clip_box.y1;
            }
            if f1 & 2 != 0 {
                tx1 = x1 + mul_div(self.clip_box.y2 - y1, x2 - x1, y2 - y1);
                ty1 = self.clip_box.y2;
            }
            if f2 & 8 != 0 {
                tx2 = x1 + mul_div(self.clip_box.y1 - y1, x2 - x1, y2 - y1);
                ty2 = self.clip_box.y1;
            }
            if f2 & 2 != 0 {
                tx2 = x1 + mul_div(self.clip_box.y2 - y1, x2 - x1, y2 - y1);
                ty2 = self.clip_box.y2;
            }

            sink.line(tx1, ty1, tx2, ty2);
        }
    }
}

impl Default for RasterizerSlClip {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const S: i32 = POLY_SUBPIXEL_SCALE as i32;

    type Lines = Vec<(i32, i32, i32, i32)>;

    #[test]
    fn test_poly_coord() {
        assert_eq!(poly_coord(0.0), 0);
        assert_eq!(poly_coord(1.0), S);
        assert_eq!(poly_coord(10.5), 2688);
        assert_eq!(poly_coord(-1.0), -S);
    }

    #[test]
    fn test_poly_coord_saturates() {
        assert_eq!(poly_coord(1e12), MAX_SUBPIXEL);
        assert_eq!(poly_coord(-1e12), -MAX_SUBPIXEL);
        assert_eq!(poly_coord(f64::INFINITY), MAX_SUBPIXEL);
        assert_eq!(poly_coord(f64::NAN), 0);
    }

    #[test]
    fn test_mul_div() {
        assert_eq!(mul_div(10, 20, 5), 40);
        assert_eq!(mul_div(0, 100, 1), 0);
        assert_eq!(mul_div(7, 3, 2), 11);
    }

    #[test]
    fn test_no_clip_passthrough() {
        let mut clip = RasterizerSlClip::new();
        let mut lines = Lines::new();
        clip.move_to(0, 0);
        clip.line_to(&mut lines, 10 * S, 10 * S);
        assert!(!clip.clipping());
        assert_eq!(lines, vec![(0, 0, 10 * S, 10 * S)]);
    }

    #[test]
    fn test_visible_line_unchanged() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 0, 100 * S, 100 * S);
        let mut lines = Lines::new();
        clip.move_to(10 * S, 10 * S);
        clip.line_to(&mut lines, 50 * S, 50 * S);
        assert_eq!(lines, vec![(10 * S, 10 * S, 50 * S, 50 * S)]);
    }

    #[test]
    fn test_fully_above_is_dropped() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 10 * S, 100 * S, 90 * S);
        let mut lines = Lines::new();
        clip.move_to(10 * S, 0);
        clip.line_to(&mut lines, 50 * S, 5 * S);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_right_overhang_is_clamped() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 0, 50 * S, 100 * S);
        let mut lines = Lines::new();
        clip.move_to(10 * S, 10 * S);
        clip.line_to(&mut lines, 80 * S, 80 * S);
        assert_eq!(
            lines,
            vec![(10 * S, 10 * S, 50 * S, 50 * S), (50 * S, 50 * S, 50 * S, 80 * S)]
        );
    }

    #[test]
    fn test_left_of_box_keeps_vertical_extent() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 0, 50 * S, 50 * S);
        let mut lines = Lines::new();
        clip.move_to(-10 * S, 5 * S);
        clip.line_to(&mut lines, -20 * S, 40 * S);
        assert_eq!(lines, vec![(0, 5 * S, 0, 40 * S)]);
    }

    #[test]
    fn test_reset_clipping() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 0, 10 * S, 10 * S);
        assert!(clip.clipping());
        clip.reset_clipping();
        assert!(!clip.clipping());
    }
}
