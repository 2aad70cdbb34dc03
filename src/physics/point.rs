//! Simulated particle backing a single graph node.

use serde::{Deserialize, Serialize};

use super::Vector;
use crate::error::{Error, Result};

/// A massive particle with position, velocity and a force accumulator.
///
/// Mass is validated at construction and never changes afterwards, so every
/// live point satisfies `mass > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    position: Vector,
    velocity: Vector,
    force: Vector,
    mass: f64,
}

impl Point {
    /// Create a point at rest.
    ///
    /// Fails with [`Error::InvalidMass`] if `mass` is not strictly positive
    /// and finite.
    pub fn new(position: Vector, mass: f64) -> Result<Self> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(Error::InvalidMass(mass));
        }
        Ok(Self {
            position,
            velocity: Vector::ZERO,
            force: Vector::ZERO,
            mass,
        })
    }

    /// Accumulate a force. Mass enters here as inertia: the accumulator
    /// receives `force / mass`.
    #[inline]
    pub fn apply_force(&mut self, force: Vector) {
        self.force.accumulate(force.divide(self.mass));
    }

    /// `velocity = (velocity + force * dt) * damping`, then clears the force
    /// accumulator.
    pub fn integrate_velocity(&mut self, dt: f64, damping: f64) {
        self.velocity.accumulate(self.force.scale(dt));
        self.velocity.scale_in_place(damping);
        self.force.reset();
    }

    /// `position = position + velocity * dt`.
    pub fn integrate_position(&mut self, dt: f64) {
        self.position.accumulate(self.velocity.scale(dt));
    }

    /// `0.5 * m * |v|^2`.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let speed = self.velocity.magnitude();
        0.5 * self.mass * speed * speed
    }

    #[inline]
    pub fn position(&self) -> Vector {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    #[inline]
    pub fn force(&self) -> Vector {
        self.force
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Move the point, e.g. when a user drags a node.
    pub fn set_position(&mut self, position: Vector) {
        self.position = position;
    }
}
