//! Shared helpers for the integration tests.

#![allow(dead_code)]

use vpath_rust::color::Rgba8;
use vpath_rust::conv_curve::flatten;
use vpath_rust::math::calc_polygon_area;
use vpath_rust::path_storage::Path;
use vpath_rust::point::Point;

pub fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Axis-aligned square, counter-clockwise.
pub fn square(x: f64, y: f64, size: f64) -> Path {
    let mut path = Path::new();
    path.rect(x, y, size, size);
    path
}

pub fn polygon(pts: &[(f64, f64)]) -> Path {
    let pts: Vec<Point> = pts.iter().map(|&(x, y)| p(x, y)).collect();
    let mut path = Path::new();
    path.polygon(&pts, true);
    path
}

/// Signed area of every subpath of `path`, flattened at unit scale.
pub fn area(path: &Path) -> f64 {
    flatten(path, 1.0)
        .iter()
        .map(|poly| calc_polygon_area(&poly.points))
        .sum()
}

/// Number of pixels in an RGBA buffer that differ from `background`.
pub fn count_pixels(data: &[u8], background: Rgba8) -> usize {
    let bg = background.to_bytes();
    data.chunks_exact(4).filter(|px| *px != bg).count()
}

/// Deterministic pseudo-random sequence for property tests.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Integer-valued coordinate in `[0, n)`.
    pub fn coord(&mut self, n: u32) -> f64 {
        (self.next_u32() % n) as f64
    }
}
