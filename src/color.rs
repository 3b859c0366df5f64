//! Premultiplied 8-bit RGBA color.
//!
//! All compositing in the kernel happens on premultiplied values, so the
//! channel arithmetic here is the exact 8-bit fixed-point kind: multiply,
//! lerp and prelerp all divide by 255 with correct rounding.

use crate::basics::{CoverType, COVER_MASK};

// ============================================================================
// Rgba8
// ============================================================================

/// RGBA color with u8 components. Values held by the compositor and by
/// `FillStyle` are premultiplied (`r, g, b <= a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Rgba8 = Rgba8 { r: 255, g: 255, b: 255, a: 255 };

    /// Raw constructor; the caller promises the channels are already
    /// premultiplied.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiply a straight-alpha color.
    pub fn from_straight(r: u8, g: u8, b: u8, a: u8) -> Self {
        let mut c = Self::new(r, g, b, a);
        c.premultiply();
        c
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    #[inline]
    pub fn invert(x: u8) -> u8 {
        Self::BASE_MASK as u8 - x
    }

    /// Fixed-point multiply, exact over u8.
    /// `(a * b + 128) >> 8`, with rounding correction.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Multiply a color component by a cover.
    #[inline]
    pub fn mult_cover(a: u8, cover: CoverType) -> u8 {
        Self::multiply(a, cover)
    }

    /// Interpolate p to q by a, assuming q is premultiplied by a.
    #[inline]
    pub fn prelerp(p: u8, q: u8, a: u8) -> u8 {
        p.wrapping_add(q).wrapping_sub(Self::multiply(p, a))
    }

    /// Interpolate p to q by a.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }

    pub fn premultiply(&mut self) -> &mut Self {
        if self.a != Self::BASE_MASK as u8 {
            if self.a == 0 {
                self.r = 0;
                self.g = 0;
                self.b = 0;
            } else {
                self.r = Self::multiply(self.r, self.a);
                self.g = Self::multiply(self.g, self.a);
                self.b = Self::multiply(self.b, self.a);
            }
        }
        self
    }

    /// Every channel scaled by `cover`; a full cover returns `self`.
    #[inline]
    pub fn scaled(&self, cover: CoverType) -> Rgba8 {
        if cover as u32 == COVER_MASK {
            return *self;
        }
        Rgba8 {
            r: Self::mult_cover(self.r, cover),
            g: Self::mult_cover(self.g, cover),
            b: Self::mult_cover(self.b, cover),
            a: Self::mult_cover(self.a, cover),
        }
    }

    /// Pixel bytes in `r, g, b, a` order.
    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_bytes(p: &[u8]) -> Rgba8 {
        Rgba8 { r: p[0], g: p[1], b: p[2], a: p[3] }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba8_multiply() {
        assert_eq!(Rgba8::multiply(255, 255), 255);
        assert_eq!(Rgba8::multiply(255, 0), 0);
        assert_eq!(Rgba8::multiply(128, 255), 128);
        assert_eq!(Rgba8::multiply(128, 128), 64);
        for a in 0..=255u32 {
            assert_eq!(Rgba8::multiply(a as u8, 255), a as u8);
        }
    }

    #[test]
    fn test_rgba8_lerp() {
        assert_eq!(Rgba8::lerp(0, 255, 0), 0);
        assert_eq!(Rgba8::lerp(0, 255, 255), 255);
        assert_eq!(Rgba8::lerp(255, 0, 255), 0);
        assert_eq!(Rgba8::lerp(100, 200, 128), 150);
    }

    #[test]
    fn test_rgba8_prelerp() {
        // src over: dst + src - dst * src_alpha
        assert_eq!(Rgba8::prelerp(0, 128, 128), 128);
        assert_eq!(Rgba8::prelerp(255, 0, 0), 255);
        assert_eq!(Rgba8::prelerp(200, 255, 255), 255);
    }

    #[test]
    fn test_rgba8_premultiply() {
        let c = Rgba8::from_straight(255, 128, 0, 128);
        assert_eq!(c, Rgba8::new(128, 64, 0, 128));
        let z = Rgba8::from_straight(255, 255, 255, 0);
        assert_eq!(z, Rgba8::TRANSPARENT);
        assert_eq!(Rgba8::from_straight(10, 20, 30, 255), Rgba8::new(10, 20, 30, 255));
    }

    #[test]
    fn test_rgba8_scaled() {
        let c = Rgba8::new(200, 100, 50, 200);
        assert_eq!(c.scaled(255), c);
        assert_eq!(c.scaled(0), Rgba8::TRANSPARENT);
        assert_eq!(c.scaled(128), Rgba8::new(100, 50, 25, 100));
    }

    #[test]
    fn test_rgba8_bytes() {
        let c = Rgba8::new(1, 2, 3, 4);
        assert_eq!(Rgba8::from_bytes(&c.to_bytes()), c);
    }
}
