//! Nearest-point hit testing.

use crate::graph::NodeId;
use crate::physics::{Point, Vector};

/// Result of a nearest-point query.
///
/// On an empty graph the result is the sentinel [`Nearest::NONE`]: no node,
/// no point, distance `-1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub node: Option<NodeId>,
    pub point: Option<Point>,
    pub distance: f64,
}

impl Nearest {
    pub const NONE: Nearest = Nearest {
        node: None,
        point: None,
        distance: -1.0,
    };

    /// Linear scan over `candidates`; the first strictly closest one wins.
    pub fn search<'a, I>(candidates: I, position: Vector) -> Nearest
    where
        I: IntoIterator<Item = (NodeId, &'a Point)>,
    {
        let mut best = Nearest::NONE;
        for (node, point) in candidates {
            let distance = point.position().distance(position);
            if best.is_none() || distance < best.distance {
                best = Nearest {
                    node: Some(node),
                    point: Some(*point),
                    distance,
                };
            }
        }
        best
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.node.is_none()
    }
}

impl Default for Nearest {
    fn default() -> Self {
        Self::NONE
    }
}
