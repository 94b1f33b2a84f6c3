use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Smallest magnitude used in place of zero when dividing by a distance,
/// size, or ratio.
pub const MIN_EPSILON: f32 = 1e-4;

/// Divide, substituting [`MIN_EPSILON`] for a denominator that is too small.
pub fn safe_div(num: f32, den: f32) -> f32 {
    if den.abs() < MIN_EPSILON {
        num / MIN_EPSILON.copysign(den)
    } else {
        num / den
    }
}

/// A 2D vector used for positions and velocities (world units, units/second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component (grows downward, i.e. deeper).
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Squared length.
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Distance to another point.
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or zero for a (near) zero vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len < MIN_EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Scale the vector down so its length is at most `max`.
    pub fn clamp_length(self, max: f32) -> Self {
        let len = self.length();
        if len > max && len > MIN_EPSILON {
            self * (max / len)
        } else {
            self
        }
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f32,
    /// Top edge (surface).
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge (sea floor).
    pub max_y: f32,
}

impl Bounds {
    /// Create bounds from the origin to `width` x `height`.
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Whether `p` lies inside (edges included).
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Clamp a point into the rectangle.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }

    /// Distance from `p` to the rectangle (0 when inside).
    pub fn distance_outside(&self, p: Vec2) -> f32 {
        self.clamp(p).distance(p)
    }

    /// World y coordinate at a fraction (0 = surface, 1 = floor) of the height.
    pub fn depth_at(&self, fraction: f32) -> f32 {
        self.min_y + self.height() * fraction.clamp(0.0, 1.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::sized(2400.0, 1600.0)
    }
}
