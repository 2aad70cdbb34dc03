//! Axis-aligned bounding box of the simulated points.

use serde::{Deserialize, Serialize};

use crate::physics::Vector;

/// Smallest half-extent a computed box is allowed to have.
const FLOOR_HALF_EXTENT: f64 = 2.0;

/// Fraction by which the box grows on each axis (split evenly both sides).
const PADDING: f64 = 0.07;

/// `[bottom_left, top_right]`, with `bottom_left <= top_right` component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    bottom_left: Vector,
    top_right: Vector,
}

impl BoundingBox {
    /// Box spanning the two corners, in whatever order they are given.
    pub fn new(a: Vector, b: Vector) -> Self {
        Self {
            bottom_left: a.min(b),
            top_right: a.max(b),
        }
    }

    /// Padded box around `positions`.
    ///
    /// The extent is floored to `[(-2, -2), (2, 2)]` so an empty or tiny
    /// graph still frames a sane area, then grown by 7% per axis.
    pub fn enclosing<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Vector>,
    {
        let mut bottom_left = Vector::new(-FLOOR_HALF_EXTENT, -FLOOR_HALF_EXTENT);
        let mut top_right = Vector::new(FLOOR_HALF_EXTENT, FLOOR_HALF_EXTENT);

        for p in positions {
            bottom_left = bottom_left.min(p);
            top_right = top_right.max(p);
        }

        let margin = top_right.subtract(bottom_left).scale(PADDING / 2.0);
        Self {
            bottom_left: bottom_left.subtract(margin),
            top_right: top_right.add(margin),
        }
    }

    #[inline]
    pub fn bottom_left(&self) -> Vector {
        self.bottom_left
    }

    #[inline]
    pub fn top_right(&self) -> Vector {
        self.top_right
    }

    /// Width and height.
    #[inline]
    pub fn size(&self) -> Vector {
        self.top_right.subtract(self.bottom_left)
    }

    #[inline]
    pub fn center(&self) -> Vector {
        self.bottom_left.add(self.top_right).scale(0.5)
    }

    pub fn contains(&self, p: Vector) -> bool {
        p.x >= self.bottom_left.x
            && p.x <= self.top_right.x
            && p.y >= self.bottom_left.y
            && p.y <= self.top_right.y
    }

    /// Overwrite this box with `other`.
    pub fn update(&mut self, other: &BoundingBox) {
        *self = *other;
    }

    /// Move both corners `fraction` of the way toward `target`.
    pub fn approach(&mut self, target: &BoundingBox, fraction: f64) {
        self.bottom_left
            .accumulate(target.bottom_left.subtract(self.bottom_left).scale(fraction));
        self.top_right
            .accumulate(target.top_right.subtract(self.top_right).scale(fraction));
    }
}

impl Default for BoundingBox {
    /// The padded floor box, i.e. the box of an empty graph.
    fn default() -> Self {
        Self::enclosing(std::iter::empty())
    }
}
