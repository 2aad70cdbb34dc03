//! Node type and its attached data.
//!
//! Nodes are the vertices in the graph. Each node has:
//! - A unique identifier assigned by the graph (monotonically increasing)
//! - Attached data: a `mass` read by the simulation, plus opaque payload
//!   (label) passed through to renderers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Ids are never reused within one graph, so an id held after the node is
/// removed simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Data attached to a node.
///
/// Only `mass` has meaning to the layout engine; it must be positive or the
/// node's point cannot be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    pub mass: f64,
    pub label: Option<String>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            mass: 1.0,
            label: None,
        }
    }
}

impl NodeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A graph vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub data: NodeData,
}
