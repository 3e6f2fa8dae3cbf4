//! 2D vector math used by the particle world.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Lengths at or below this are treated as zero when normalizing.
const NORMALIZE_EPSILON: f64 = 1e-4;

/// A 2D vector in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct V2 {
    pub x: f64,
    pub y: f64,
}

impl V2 {
    pub const ZERO: V2 = V2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: V2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn scale(self, factor: f64) -> V2 {
        V2::new(self.x * factor, self.y * factor)
    }

    pub fn norm_sqr(self) -> f64 {
        self.dot(self)
    }

    pub fn len(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    pub fn distance(self, other: V2) -> f64 {
        (self - other).len()
    }

    /// Unit vector in the same direction, or zero for near-zero vectors.
    pub fn normalized(self) -> V2 {
        let len = self.len();
        if len <= NORMALIZE_EPSILON {
            return V2::ZERO;
        }
        V2::new(self.x / len, self.y / len)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Clamp each component into `[0, extent]`.
    pub fn clamp_to(self, extent: V2) -> V2 {
        V2::new(self.x.clamp(0.0, extent.x.max(0.0)), self.y.clamp(0.0, extent.y.max(0.0)))
    }
}

impl Add for V2 {
    type Output = V2;
    fn add(self, rhs: V2) -> V2 {
        V2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for V2 {
    fn add_assign(&mut self, rhs: V2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for V2 {
    type Output = V2;
    fn sub(self, rhs: V2) -> V2 {
        V2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for V2 {
    fn sub_assign(&mut self, rhs: V2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for V2 {
    type Output = V2;
    fn mul(self, rhs: f64) -> V2 {
        self.scale(rhs)
    }
}

impl Neg for V2 {
    type Output = V2;
    fn neg(self) -> V2 {
        V2::new(-self.x, -self.y)
    }
}

impl From<V2> for kurbo::Point {
    fn from(v: V2) -> Self {
        kurbo::Point::new(v.x, v.y)
    }
}

impl From<kurbo::Point> for V2 {
    fn from(p: kurbo::Point) -> Self {
        V2::new(p.x, p.y)
    }
}
