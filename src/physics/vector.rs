//! 2D vector algebra.
//!
//! `Vector` is a `Copy` value type. The combinators (`add`, `subtract`,
//! `scale`, `divide`, `normalize`, `perpendicular`) always return a new value
//! and never touch their operands. Simulation state (position, velocity,
//! force) is mutated only through the explicit accumulator entry points
//! (`accumulate`, `scale_in_place`, `reset`), which the integrator owns.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-width of the square used for random initial placement.
const RANDOM_HALF_EXTENT: f64 = 5.0;

/// A 2D vector in simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// A uniformly distributed vector in `[-5, 5)` on both axes.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: 2.0 * RANDOM_HALF_EXTENT * (rng.random::<f64>() - 0.5),
            y: 2.0 * RANDOM_HALF_EXTENT * (rng.random::<f64>() - 0.5),
        }
    }

    // =========================================================================
    // Value algebra
    // =========================================================================

    #[inline]
    pub fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    #[inline]
    pub fn subtract(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn scale(self, n: f64) -> Vector {
        Vector::new(self.x * n, self.y * n)
    }

    /// Divide by a scalar. Dividing by zero yields the zero vector.
    #[inline]
    pub fn divide(self, n: f64) -> Vector {
        if n == 0.0 {
            Vector::ZERO
        } else {
            Vector::new(self.x / n, self.y / n)
        }
    }

    /// Euclidean norm.
    #[inline]
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; the zero vector normalizes to zero.
    #[inline]
    pub fn normalize(self) -> Vector {
        self.divide(self.magnitude())
    }

    /// Rotated by +90 degrees.
    #[inline]
    pub fn perpendicular(self) -> Vector {
        Vector::new(-self.y, self.x)
    }

    #[inline]
    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn distance(self, other: Vector) -> f64 {
        self.subtract(other).magnitude()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Vector) -> Vector {
        Vector::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Vector) -> Vector {
        Vector::new(self.x.max(other.x), self.y.max(other.y))
    }

    // =========================================================================
    // Accumulators (simulation state only)
    // =========================================================================

    /// Add `other` into this vector in place.
    #[inline]
    pub fn accumulate(&mut self, other: Vector) {
        self.x += other.x;
        self.y += other.y;
    }

    /// Multiply this vector by `n` in place.
    #[inline]
    pub fn scale_in_place(&mut self, n: f64) {
        self.x *= n;
        self.y *= n;
    }

    /// Reset to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Vector::ZERO;
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Vector {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Vector {
    type Output = Vector;

    #[inline]
    fn add(self, rhs: Vector) -> Vector {
        Vector::add(self, rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;

    #[inline]
    fn sub(self, rhs: Vector) -> Vector {
        self.subtract(rhs)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    #[inline]
    fn mul(self, rhs: f64) -> Vector {
        self.scale(rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    #[inline]
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}
