//! Graph data structures and operations.
//!
//! This module provides the graph model the layout engine operates on: a
//! directed multigraph backed by petgraph's StableGraph, with an ordered
//! adjacency index for parallel edges and synchronous change notification.

mod edge;
mod events;
mod model;
mod node;

pub use edge::{Edge, EdgeData, EdgeId};
pub use events::{ChangeListener, GraphChange, ListenerId};
pub use model::Graph;
pub use node::{Node, NodeData, NodeId};

pub(crate) use events::RemovalHook;
