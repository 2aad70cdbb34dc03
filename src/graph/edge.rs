//! Edge type and its attached data.
//!
//! Edges are the connections between nodes. Each edge has:
//! - A unique identifier
//! - Source and target node IDs (ordered; multi-edges are allowed)
//! - Attached data: a `rest_length` read by the simulation, plus opaque
//!   rendering payload

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
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

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// Data attached to an edge.
///
/// `rest_length` is the natural length of the edge's spring. `weight`,
/// `directional` and `label` are carried for renderers only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeData {
    pub rest_length: f64,
    pub weight: f32,
    pub directional: bool,
    pub label: Option<String>,
}

impl Default for EdgeData {
    fn default() -> Self {
        Self {
            rest_length: 1.0,
            weight: 1.0,
            directional: true,
            label: None,
        }
    }
}

impl EdgeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rest_length(mut self, rest_length: f64) -> Self {
        self.rest_length = rest_length;
        self
    }

    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn directional(mut self, directional: bool) -> Self {
        self.directional = directional;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub data: EdgeData,
}

impl Edge {
    /// Whether `node` is this edge's source or target.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}
