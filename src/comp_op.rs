//! Porter–Duff compositing operators on premultiplied RGBA8 pixels.
//!
//! Every operator is expressed as a pair of factors applied to the source
//! and destination, `D' = S * Fa + D * Fb`, evaluated with exact 8-bit
//! fixed-point multiplies. Partial coverage interpolates between the old
//! destination and the fully covered result.

use crate::basics::{CoverType, COVER_MASK};
use crate::color::Rgba8;

// ============================================================================
// CompOp enum
// ============================================================================

/// Porter–Duff compositing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CompOp {
    Clear = 0,
    Src = 1,
    Dst = 2,
    #[default]
    SrcOver = 3,
    DstOver = 4,
    SrcIn = 5,
    DstIn = 6,
    SrcOut = 7,
    DstOut = 8,
    SrcAtop = 9,
    DstAtop = 10,
    Xor = 11,
    Plus = 12,
}

impl CompOp {
    pub const ALL: [CompOp; 13] = [
        CompOp::Clear,
        CompOp::Src,
        CompOp::Dst,
        CompOp::SrcOver,
        CompOp::DstOver,
        CompOp::SrcIn,
        CompOp::DstIn,
        CompOp::SrcOut,
        CompOp::DstOut,
        CompOp::SrcAtop,
        CompOp::DstAtop,
        CompOp::Xor,
        CompOp::Plus,
    ];

    /// Source and destination factors.
    fn factors(self) -> (Factor, Factor) {
        use Factor::*;
        match self {
            CompOp::Clear => (Zero, Zero),
            CompOp::Src => (One, Zero),
            CompOp::Dst => (Zero, One),
            CompOp::SrcOver => (One, InvSrcAlpha),
            CompOp::DstOver => (InvDstAlpha, One),
            CompOp::SrcIn => (DstAlpha, Zero),
            CompOp::DstIn => (Zero, SrcAlpha),
            CompOp::SrcOut => (InvDstAlpha, Zero),
            CompOp::DstOut => (Zero, InvSrcAlpha),
            CompOp::SrcAtop => (DstAlpha, InvSrcAlpha),
            CompOp::DstAtop => (InvDstAlpha, SrcAlpha),
            CompOp::Xor => (InvDstAlpha, InvSrcAlpha),
            CompOp::Plus => (One, One),
        }
    }

    /// Whether a fully transparent source leaves the destination untouched,
    /// so zero-alpha spans can be skipped.
    pub fn is_noop_for_transparent_source(self) -> bool {
        matches!(
            self,
            CompOp::Dst
                | CompOp::SrcOver
                | CompOp::DstOver
                | CompOp::SrcAtop
                | CompOp::DstOut
                | CompOp::Xor
                | CompOp::Plus
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Factor {
    Zero,
    One,
    SrcAlpha,
    InvSrcAlpha,
    DstAlpha,
    InvDstAlpha,
}

impl Factor {
    #[inline]
    fn value(self, sa: u8, da: u8) -> u8 {
        match self {
            Factor::Zero => 0,
            Factor::One => 255,
            Factor::SrcAlpha => sa,
            Factor::InvSrcAlpha => Rgba8::invert(sa),
            Factor::DstAlpha => da,
            Factor::InvDstAlpha => Rgba8::invert(da),
        }
    }
}

// ============================================================================
// Per-pixel blending
// ============================================================================

#[inline]
fn combine(s: u8, fa: u8, d: u8, fb: u8) -> u8 {
    let v = Rgba8::multiply(s, fa) as u32 + Rgba8::multiply(d, fb) as u32;
    v.min(Rgba8::BASE_MASK) as u8
}

/// Composite premultiplied `src` onto the pixel `p` (4 bytes, RGBA order)
/// with coverage `cover`.
#[inline]
pub fn blend_pix(op: CompOp, p: &mut [u8], src: Rgba8, cover: CoverType) {
    if cover == 0 {
        return;
    }
    match op {
        CompOp::Dst => return,
        CompOp::SrcOver => {
            // fast path: scaling the source by cover is exact for src-over
            let s = src.scaled(cover);
            if s.a == 255 {
                p.copy_from_slice(&s.to_bytes());
            } else if s.a > 0 || s.r > 0 || s.g > 0 || s.b > 0 {
                p[0] = Rgba8::prelerp(p[0], s.r, s.a);
                p[1] = Rgba8::prelerp(p[1], s.g, s.a);
                p[2] = Rgba8::prelerp(p[2], s.b, s.a);
                p[3] = Rgba8::prelerp(p[3], s.a, s.a);
            }
            return;
        }
        _ => {}
    }

    let d = Rgba8::from_bytes(p);
    let (fa, fb) = op.factors();
    let fa = fa.value(src.a, d.a);
    let fb = fb.value(src.a, d.a);
    let full = Rgba8 {
        r: combine(src.r, fa, d.r, fb),
        g: combine(src.g, fa, d.g, fb),
        b: combine(src.b, fa, d.b, fb),
        a: combine(src.a, fa, d.a, fb),
    };
    let out = if cover as u32 == COVER_MASK {
        full
    } else {
        Rgba8 {
            r: Rgba8::lerp(d.r, full.r, cover),
            g: Rgba8::lerp(d.g, full.g, cover),
            b: Rgba8::lerp(d.b, full.b, cover),
            a: Rgba8::lerp(d.a, full.a, cover),
        }
    };
    p.copy_from_slice(&out.to_bytes());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn blend(op: CompOp, dst: Rgba8, src: Rgba8, cover: u8) -> Rgba8 {
        let mut p = dst.to_bytes();
        blend_pix(op, &mut p, src, cover);
        Rgba8::from_bytes(&p)
    }

    const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
    const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);
    const HALF_GREEN: Rgba8 = Rgba8::new(0, 128, 0, 128);

    #[test]
    fn test_comp_op_default() {
        assert_eq!(CompOp::default(), CompOp::SrcOver);
    }

    #[test]
    fn test_clear() {
        assert_eq!(blend(CompOp::Clear, RED, BLUE, 255), Rgba8::TRANSPARENT);
        let half = blend(CompOp::Clear, RED, BLUE, 128);
        assert_eq!(half, Rgba8::new(127, 0, 0, 127));
    }

    #[test]
    fn test_src_and_dst() {
        assert_eq!(blend(CompOp::Src, RED, HALF_GREEN, 255), HALF_GREEN);
        assert_eq!(blend(CompOp::Dst, RED, HALF_GREEN, 255), RED);
    }

    #[test]
    fn test_src_over() {
        assert_eq!(blend(CompOp::SrcOver, RED, BLUE, 255), BLUE);
        assert_eq!(blend(CompOp::SrcOver, RED, HALF_GREEN, 255), Rgba8::new(127, 128, 0, 255));
        assert_eq!(blend(CompOp::SrcOver, Rgba8::TRANSPARENT, HALF_GREEN, 255), HALF_GREEN);
    }

    #[test]
    fn test_src_over_partial_cover() {
        let out = blend(CompOp::SrcOver, Rgba8::TRANSPARENT, RED, 128);
        assert_eq!(out, Rgba8::new(128, 0, 0, 128));
    }

    #[test]
    fn test_dst_over() {
        assert_eq!(blend(CompOp::DstOver, RED, BLUE, 255), RED);
        assert_eq!(blend(CompOp::DstOver, Rgba8::TRANSPARENT, BLUE, 255), BLUE);
    }

    #[test]
    fn test_in_and_out() {
        assert_eq!(blend(CompOp::SrcIn, HALF_GREEN, RED, 255), Rgba8::new(128, 0, 0, 128));
        assert_eq!(blend(CompOp::DstIn, RED, HALF_GREEN, 255), Rgba8::new(128, 0, 0, 128));
        assert_eq!(blend(CompOp::SrcOut, RED, BLUE, 255), Rgba8::TRANSPARENT);
        assert_eq!(blend(CompOp::SrcOut, Rgba8::TRANSPARENT, BLUE, 255), BLUE);
        assert_eq!(blend(CompOp::DstOut, RED, BLUE, 255), Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_atop_keeps_destination_alpha() {
        let out = blend(CompOp::SrcAtop, HALF_GREEN, RED, 255);
        assert_eq!(out.a, 128);
        assert_eq!(out.r, 128);
        let out = blend(CompOp::DstAtop, HALF_GREEN, RED, 255);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn test_xor_of_opaque_pixels_is_empty() {
        assert_eq!(blend(CompOp::Xor, RED, BLUE, 255), Rgba8::TRANSPARENT);
        assert_eq!(blend(CompOp::Xor, Rgba8::TRANSPARENT, BLUE, 255), BLUE);
    }

    #[test]
    fn test_plus_saturates() {
        let out = blend(CompOp::Plus, RED, Rgba8::new(200, 100, 0, 255), 255);
        assert_eq!(out, Rgba8::new(255, 100, 0, 255));
    }

    #[test]
    fn test_zero_cover_is_noop() {
        for op in CompOp::ALL {
            assert_eq!(blend(op, HALF_GREEN, RED, 0), HALF_GREEN, "{:?}", op);
        }
    }

    #[test]
    fn test_transparent_source_noop_flag() {
        for op in CompOp::ALL {
            if op.is_noop_for_transparent_source() {
                assert_eq!(blend(op, HALF_GREEN, Rgba8::TRANSPARENT, 255), HALF_GREEN, "{:?}", op);
            }
        }
    }
}
