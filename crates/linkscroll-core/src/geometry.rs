//! Geometric primitives shared by scroll regions and the nested-scroll hook.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A 2D scroll amount in logical pixels.
///
/// Offsets travelling through the nested-scroll hook are in gesture space:
/// a finger moving down yields a positive `y`. Scroll regions take deltas in
/// scroll-offset space, where a positive value grows the scroll offset.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vertical-only offset.
    pub const fn vertical(y: f32) -> Self {
        Self { x: 0.0, y }
    }

    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Offset {
    fn sub_assign(&mut self, rhs: Offset) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Offset {
    type Output = Offset;

    fn mul(self, factor: f32) -> Offset {
        Offset::new(self.x * factor, self.y * factor)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}
