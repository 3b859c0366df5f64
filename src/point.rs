//! Point and vector primitives.
//!
//! Two small `Copy` types: `Point` is a location, `Vector` a displacement.
//! Subtracting points yields a vector; adding a vector to a point moves it.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Squared lengths below this are treated as zero by `Vector::try_unit`.
pub const SCALAR_NEARLY_ZERO: f64 = 1.0 / (1 << 24) as f64;

// ============================================================================
// Point
// ============================================================================

/// A location in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation: `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    #[inline]
    pub fn distance_squared(self, other: Point) -> f64 {
        (other - self).length_squared()
    }

    #[inline]
    pub fn midpoint(self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }

    /// The vector from the origin to this point.
    #[inline]
    pub fn to_vector(self) -> Vector {
        Vector::new(self.x, self.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise comparison within `eps`.
    #[inline]
    pub fn approx_eq(self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl Sub for Point {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign<Vector> for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub<Vector> for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Vector) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ============================================================================
// Vector
// ============================================================================

/// A displacement in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Signed area term `self.x * other.y - self.y * other.x`.
    /// Positive when `other` is counter-clockwise from `self` (y up).
    #[inline]
    pub fn cross(self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the same direction; a zero vector stays zero.
    #[inline]
    pub fn unit(self) -> Vector {
        self.try_unit().unwrap_or(Vector::ZERO)
    }

    /// Unit vector, or `None` when the length is too small to normalize.
    #[inline]
    pub fn try_unit(self) -> Option<Vector> {
        let len2 = self.length_squared();
        if len2 <= SCALAR_NEARLY_ZERO * SCALAR_NEARLY_ZERO || !len2.is_finite() {
            return None;
        }
        let len = len2.sqrt();
        Some(Vector::new(self.x / len, self.y / len))
    }

    /// Perpendicular, rotated a quarter turn counter-clockwise (y up).
    #[inline]
    pub fn normal(self) -> Vector {
        Vector::new(-self.y, self.x)
    }

    #[inline]
    pub fn scale(self, k: f64) -> Vector {
        Vector::new(self.x * k, self.y * k)
    }

    /// Rescale to the given length; a zero vector stays zero.
    #[inline]
    pub fn with_length(self, len: f64) -> Vector {
        self.unit().scale(len)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    #[inline]
    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl Add for Vector {
    type Output = Vector;
    #[inline]
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    #[inline]
    fn mul(self, k: f64) -> Vector {
        self.scale(k)
    }
}

impl Neg for Vector {
    type Output = Vector;
    #[inline]
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

// ============================================================================
// Tests
// ============================================================================
