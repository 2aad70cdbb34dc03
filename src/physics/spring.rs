//! Simulated connector backing a single graph edge.

use serde::{Deserialize, Serialize};

use super::Vector;
use crate::graph::NodeId;

/// A Hooke spring between two points.
///
/// Endpoints are referenced by the id of the node whose point they are; the
/// points themselves live in the layout's simulation context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    point1: NodeId,
    point2: NodeId,
    rest_length: f64,
    stiffness: f64,
}

impl Spring {
    pub fn new(point1: NodeId, point2: NodeId, rest_length: f64, stiffness: f64) -> Self {
        Self {
            point1,
            point2,
            rest_length,
            stiffness,
        }
    }

    /// A bookkeeping spring for parallel or reverse edges: zero rest length and
    /// zero stiffness, so it contributes no force.
    pub fn degenerate(point1: NodeId, point2: NodeId) -> Self {
        Self::new(point1, point2, 0.0, 0.0)
    }

    /// Forces on `(point1, point2)` given their current positions.
    ///
    /// With `d = p2 - p1` and `displacement = rest_length - |d|`, the force
    /// `stiffness * displacement` along `d` is split in half with opposite
    /// signs.
    pub fn forces(&self, p1: Vector, p2: Vector) -> (Vector, Vector) {
        let d = p2.subtract(p1);
        let displacement = self.rest_length - d.magnitude();
        let f = d.normalize().scale(self.stiffness * displacement);
        (f.scale(-0.5), f.scale(0.5))
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.stiffness == 0.0
    }

    #[inline]
    pub fn point1(&self) -> NodeId {
        self.point1
    }

    #[inline]
    pub fn point2(&self) -> NodeId {
        self.point2
    }

    #[inline]
    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    #[inline]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }
}
