//! Premultiplied RGBA32 compositor.
//!
//! Provides the `PixelFormat` trait the rasterizer paints through and
//! `Compositor`, which blends a constant premultiplied color into a
//! `RenderingBuffer` with a runtime-selectable `CompOp`.

use crate::basics::{CoverType, COVER_FULL};
use crate::color::Rgba8;
use crate::comp_op::{blend_pix, CompOp};
use crate::rendering_buffer::{RenderingBuffer, BPP};

// ============================================================================
// PixelFormat trait
// ============================================================================

/// Span-level access to a pixel surface.
///
/// Coordinates passed in are already clipped to `width() x height()`.
pub trait PixelFormat {
    type ColorType;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Blend a horizontal span of `covers.len()` pixels starting at `(x, y)`
    /// with per-pixel coverage.
    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Self::ColorType, covers: &[CoverType]);

    /// Blend `len` pixels at `(x, y)` with uniform coverage.
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::ColorType, cover: CoverType);

    /// Get the pixel color at `(x, y)`, or the default color outside the
    /// buffer.
    fn pixel(&self, x: i32, y: i32) -> Self::ColorType;
}

// ============================================================================
// Compositor
// ============================================================================

/// Compositor over a premultiplied RGBA32 buffer.
pub struct Compositor<'a> {
    rbuf: RenderingBuffer<'a>,
    comp_op: CompOp,
}

impl<'a> Compositor<'a> {
    pub fn new(rbuf: RenderingBuffer<'a>) -> Self {
        Self { rbuf, comp_op: CompOp::SrcOver }
    }

    pub fn new_with_op(rbuf: RenderingBuffer<'a>, op: CompOp) -> Self {
        Self { rbuf, comp_op: op }
    }

    pub fn comp_op(&self) -> CompOp {
        self.comp_op
    }

    pub fn set_comp_op(&mut self, op: CompOp) {
        self.comp_op = op;
    }

    pub fn rbuf(&self) -> &RenderingBuffer<'a> {
        &self.rbuf
    }

    pub fn rbuf_mut(&mut self) -> &mut RenderingBuffer<'a> {
        &mut self.rbuf
    }

    /// Overwrite every pixel with `c`, ignoring the operator.
    pub fn clear(&mut self, c: &Rgba8) {
        self.rbuf.fill(*c);
    }

    fn skips(&self, c: &Rgba8) -> bool {
        c.is_transparent() && self.comp_op.is_noop_for_transparent_source()
    }
}

impl<'a> PixelFormat for Compositor<'a> {
    type ColorType = Rgba8;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return Rgba8::TRANSPARENT;
        }
        self.rbuf.pixel(x as u32, y as u32)
    }

    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, cover: CoverType) {
        if self.skips(c) {
            return;
        }
        let op = self.comp_op;
        let row = self.rbuf.row_slice_mut(y as u32);
        let start = x as usize * BPP;
        let end = start + len as usize * BPP;
        if op == CompOp::Src && cover == COVER_FULL {
            let bytes = c.to_bytes();
            for p in row[start..end].chunks_exact_mut(BPP) {
                p.copy_from_slice(&bytes);
            }
            return;
        }
        for p in row[start..end].chunks_exact_mut(BPP) {
            blend_pix(op, p, *c, cover);
        }
    }

    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Rgba8, covers: &[CoverType]) {
        if self.skips(c) {
            return;
        }
        let op = self.comp_op;
        let row = self.rbuf.row_slice_mut(y as u32);
        let start = x as usize * BPP;
        let end = start + covers.len() * BPP;
        for (p, &cover) in row[start..end].chunks_exact_mut(BPP).zip(covers) {
            blend_pix(op, p, *c, cover);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
