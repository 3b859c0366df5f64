//! Rendering buffer: row-oriented access to a caller-owned RGBA pixel slice.
//!
//! The buffer borrows the host's bytes for the duration of a draw. Each row
//! holds `width` packed 4-byte premultiplied RGBA pixels, rows are `stride`
//! bytes apart, and any bytes past `width * 4` inside a row are left alone.

use crate::color::Rgba8;

/// Bytes per pixel.
pub const BPP: usize = 4;

// ============================================================================
// RenderingBuffer
// ============================================================================

pub struct RenderingBuffer<'a> {
    buf: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> RenderingBuffer<'a> {
    /// Attach to `buf` with tightly packed rows.
    pub fn new(buf: &'a mut [u8], width: u32, height: u32) -> Self {
        Self::with_stride(buf, width, height, width as usize * BPP)
    }

    /// Attach to `buf` with rows `stride` bytes apart.
    ///
    /// # Panics
    /// If `stride < width * 4` or the slice is shorter than `stride * height`.
    pub fn with_stride(buf: &'a mut [u8], width: u32, height: u32, stride: usize) -> Self {
        assert!(
            stride >= width as usize * BPP,
            "stride {} is smaller than a row of {} pixels",
            stride,
            width
        );
        let needed = stride * height as usize;
        assert!(
            buf.len() >= needed,
            "pixel buffer holds {} bytes, {}x{} with stride {} needs {}",
            buf.len(),
            width,
            height,
            stride,
            needed
        );
        Self { buf, width, height, stride }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The pixel bytes of row `y`, `width * 4` long.
    pub fn row_slice(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {} out of bounds (height={})", y, self.height);
        let start = y as usize * self.stride;
        &self.buf[start..start + self.width as usize * BPP]
    }

    pub fn row_slice_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height, "row {} out of bounds (height={})", y, self.height);
        let start = y as usize * self.stride;
        &mut self.buf[start..start + self.width as usize * BPP]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let off = x as usize * BPP;
        Rgba8::from_bytes(&self.row_slice(y)[off..off + BPP])
    }

    pub fn copy_pixel(&mut self, x: u32, y: u32, c: Rgba8) {
        let off = x as usize * BPP;
        self.row_slice_mut(y)[off..off + BPP].copy_from_slice(&c.to_bytes());
    }

    /// Fill every pixel with `c`.
    pub fn fill(&mut self, c: Rgba8) {
        let bytes = c.to_bytes();
        for y in 0..self.height {
            for px in self.row_slice_mut(y).chunks_exact_mut(BPP) {
                px.copy_from_slice(&bytes);
            }
        }
    }

    /// Copy the overlapping region of `src` into this buffer.
    pub fn copy_from(&mut self, src: &RenderingBuffer<'_>) {
        let h = self.height.min(src.height);
        let len = self.width.min(src.width) as usize * BPP;
        for y in 0..h {
            self.row_slice_mut(y)[..len].copy_from_slice(&src.row_slice(y)[..len]);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
