//! Error types for graph mutation and simulation setup.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors reported by the layout engine.
///
/// Only construction-time contract violations are errors. Operations on
/// entities that are already gone (double removal, unknown ids) are no-ops.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An edge referenced a node that is not a member of the graph.
    /// The graph is left untouched.
    #[error("edge {from} -> {to} references a node that is not in the graph")]
    InvalidReference {
        /// Requested source node.
        from: NodeId,
        /// Requested target node.
        to: NodeId,
    },

    /// A point was constructed with a non-positive or non-finite mass.
    #[error("point mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    /// An edge was given a negative or non-finite spring rest length.
    #[error("edge rest length must be non-negative and finite, got {0}")]
    InvalidRestLength(f64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
