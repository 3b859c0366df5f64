//! High-level path renderer.
//!
//! `Renderer` owns a `Compositor` over a caller-supplied buffer together
//! with a `Rasterizer` and a pool of scratch paths, and paints whole paths:
//! curves are flattened on the way into the rasterizer, and strokes are
//! expanded into outlines before being filled with the non-zero rule.

use crate::basics::{FillingRule, RectD};
use crate::color::Rgba8;
use crate::conv_curve::ConvCurve;
use crate::path_storage::Path;
use crate::pixfmt_rgba::{Compositor, PixelFormat};
use crate::pool::PathPool;
use crate::rasterizer_scanline::Rasterizer;
use crate::rendering_buffer::RenderingBuffer;
use crate::style::{FillStyle, StrokeStyle};
use crate::vcgen_stroke::Stroker;

/// Paints paths into a premultiplied RGBA buffer.
pub struct Renderer<'a> {
    pf: Compositor<'a>,
    ras: Rasterizer,
    pool: PathPool,
    approximation_scale: f64,
}

impl<'a> Renderer<'a> {
    pub fn new(rbuf: RenderingBuffer<'a>) -> Self {
        let mut ras = Rasterizer::new();
        ras.set_clip_box(0.0, 0.0, rbuf.width() as f64, rbuf.height() as f64);
        Self {
            pf: Compositor::new(rbuf),
            ras,
            pool: PathPool::new(),
            approximation_scale: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.pf.width()
    }

    pub fn height(&self) -> u32 {
        self.pf.height()
    }

    pub fn compositor(&self) -> &Compositor<'a> {
        &self.pf
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor<'a> {
        &mut self.pf
    }

    /// Device units per path unit, used for curve flattening and stroke
    /// round geometry.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approximation_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.approximation_scale
    }

    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        self.pf.pixel(x, y)
    }

    /// Overwrite the whole buffer with `c`.
    pub fn clear(&mut self, c: Rgba8) {
        self.pf.clear(&c);
    }

    /// Fill `path` with `style`. Returns the number of pixels painted.
    pub fn fill_path(&mut self, path: &Path, style: &FillStyle) -> usize {
        fill(&mut self.ras, &mut self.pf, path, style, self.approximation_scale)
    }

    /// Stroke `path` with `stroke`, painting the outline with `fill`'s color
    /// and operator. Returns the number of pixels painted.
    pub fn stroke_path(&mut self, path: &Path, stroke: &StrokeStyle, fill_style: &FillStyle) -> usize {
        let mut stroker = Stroker::from_style(stroke);
        stroker.set_approximation_scale(self.approximation_scale);

        let mut outline = self.pool.rent();
        stroker.stroke_into(path, &mut outline);
        let style = fill_style.with_rule(FillingRule::NonZero);
        fill(&mut self.ras, &mut self.pf, &outline, &style, self.approximation_scale)
    }
}

fn fill(
    ras: &mut Rasterizer,
    pf: &mut Compositor<'_>,
    path: &Path,
    style: &FillStyle,
    approximation_scale: f64,
) -> usize {
    let target = RectD::new(0.0, 0.0, pf.width() as f64, pf.height() as f64);
    match path.bounds() {
        Some(b) if b.overlaps(&target) => {}
        _ => return 0,
    }

    ras.reset();
    ras.set_filling_rule(style.rule);
    pf.set_comp_op(style.op);

    let mut curve = ConvCurve::new(path);
    curve.set_approximation_scale(approximation_scale);
    ras.add_path(&mut curve, 0);
    ras.render(pf, &style.color)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comp_op::CompOp;
    use crate::math_stroke::LineJoin;

    fn count_painted(r: &Renderer<'_>) -> usize {
        let mut n = 0;
        for y in 0..r.height() as i32 {
            for x in 0..r.width() as i32 {
                if r.pixel(x, y) != Rgba8::TRANSPARENT {
                    n += 1;
                }
            }
        }
        n
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Path {
        let mut p = Path::new();
        p.rect(x, y, w, h);
        p
    }

    #[test]
    fn test_fill_rect_exact_pixels() {
        let mut data = vec![0u8; 20 * 20 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 20, 20));
        let n = r.fill_path(&rect(5.0, 5.0, 10.0, 10.0), &FillStyle::new(Rgba8::BLACK));
        assert_eq!(n, 100);
        assert_eq!(count_painted(&r), 100);
        assert_eq!(r.pixel(5, 5), Rgba8::BLACK);
        assert_eq!(r.pixel(14, 14), Rgba8::BLACK);
        assert_eq!(r.pixel(15, 15), Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_pixel_reads_off_buffer_as_transparent() {
        let mut data = vec![0u8; 8 * 8 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 8, 8));
        r.clear(Rgba8::WHITE);
        assert_eq!(r.pixel(0, 0), Rgba8::WHITE);
        assert_eq!(r.pixel(-1, 4), Rgba8::TRANSPARENT);
        assert_eq!(r.pixel(4, -3), Rgba8::TRANSPARENT);
        assert_eq!(r.pixel(8, 0), Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_fill_outside_buffer_is_noop() {
        let mut data = vec![0u8; 10 * 10 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 10, 10));
        assert_eq!(r.fill_path(&rect(20.0, 20.0, 5.0, 5.0), &FillStyle::default()), 0);
        assert_eq!(r.fill_path(&Path::new(), &FillStyle::default()), 0);
        assert_eq!(count_painted(&r), 0);
    }

    #[test]
    fn test_fill_circle_area() {
        let mut data = vec![0u8; 32 * 32 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 32, 32));
        let mut circle = Path::new();
        circle.circle(16.0, 16.0, 8.0);
        let n = r.fill_path(&circle, &FillStyle::new(Rgba8::WHITE));
        // pi * 8^2 ~ 201
        assert!((180..=215).contains(&n), "painted {}", n);
    }

    #[test]
    fn test_stroke_square_ring() {
        let mut data = vec![0u8; 30 * 30 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 30, 30));
        let stroke = StrokeStyle::new(2.0).with_join(LineJoin::Miter);
        let n = r.stroke_path(&rect(5.0, 5.0, 10.0, 10.0), &stroke, &FillStyle::new(Rgba8::BLACK));
        assert_eq!(n, 12 * 12 - 8 * 8);
        assert_eq!(r.pixel(10, 10), Rgba8::TRANSPARENT);
        assert_eq!(r.pixel(4, 4), Rgba8::BLACK);
    }

    #[test]
    fn test_stroke_ignores_fill_rule() {
        let mut data = vec![0u8; 30 * 30 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 30, 30));
        let fill = FillStyle::new(Rgba8::BLACK).with_rule(FillingRule::EvenOdd);
        let n = r.stroke_path(&rect(5.0, 5.0, 10.0, 10.0), &StrokeStyle::new(2.0), &fill);
        assert_eq!(n, 80);
    }

    #[test]
    fn test_src_over_blends_with_background() {
        let mut data = vec![0u8; 8 * 8 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 8, 8));
        r.clear(Rgba8::WHITE);
        let half_blue = Rgba8::new(0, 0, 128, 128);
        r.fill_path(&rect(0.0, 0.0, 4.0, 8.0), &FillStyle::new(half_blue));
        let p = r.pixel(1, 1);
        assert_eq!(p.a, 255);
        assert_eq!(p.b, 255);
        assert!((126..=128).contains(&p.r), "r = {}", p.r);
        assert_eq!(r.pixel(6, 1), Rgba8::WHITE);
    }

    #[test]
    fn test_clear_op_erases_coverage() {
        let mut data = vec![0u8; 8 * 8 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 8, 8));
        r.clear(Rgba8::WHITE);
        let n = r.fill_path(&rect(2.0, 2.0, 4.0, 4.0), &FillStyle::default().with_op(CompOp::Clear));
        assert_eq!(n, 16);
        assert_eq!(r.pixel(3, 3), Rgba8::TRANSPARENT);
        assert_eq!(r.pixel(0, 0), Rgba8::WHITE);
        assert_eq!(r.compositor().comp_op(), CompOp::Clear);
    }

    #[test]
    fn test_repeated_fills_reuse_rasterizer() {
        let mut data = vec![0u8; 20 * 20 * 4];
        let mut r = Renderer::new(RenderingBuffer::new(&mut data, 20, 20));
        let style = FillStyle::new(Rgba8::BLACK);
        assert_eq!(r.fill_path(&rect(0.0, 0.0, 5.0, 5.0), &style), 25);
        assert_eq!(r.fill_path(&rect(10.0, 10.0, 5.0, 5.0), &style), 25);
        assert_eq!(count_painted(&r), 50);
    }
}
