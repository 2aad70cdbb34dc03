//! Graph - node/edge sets with an ordered adjacency index.
//!
//! Topology is stored in petgraph's StableGraph so incident edges can be found
//! without scanning the whole edge set. On top of it the graph keeps:
//! - id → entry maps for nodes and edges (ids are never reused)
//! - an adjacency index `(source, target) → [EdgeId]` in insertion order,
//!   which the layout engine consults for its spring merge policy
//! - the ordered list of change listeners

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use tracing::{trace, warn};

use super::events::{ChangeListener, GraphChange, ListenerId, Listeners, NoHook, RemovalHook};
use super::{Edge, EdgeData, EdgeId, Node, NodeData, NodeId};
use crate::error::{Error, Result};

struct NodeEntry {
    node: Node,
    index: NodeIndex,
}

struct EdgeEntry {
    edge: Edge,
    index: EdgeIndex,
}

/// A directed multigraph with change notification.
///
/// Invariants:
/// - every edge's endpoints were members of the node set when it was added,
///   and removing a node removes its incident edges first
/// - the adjacency index is exactly the edge set grouped by ordered pair
pub struct Graph {
    topology: StableGraph<NodeId, EdgeId, Directed>,
    nodes: BTreeMap<NodeId, NodeEntry>,
    edges: BTreeMap<EdgeId, EdgeEntry>,
    adjacency: HashMap<(NodeId, NodeId), Vec<EdgeId>>,
    listeners: Listeners,
    next_node_id: u32,
    next_edge_id: u32,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            topology: StableGraph::new(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            adjacency: HashMap::new(),
            listeners: Listeners::default(),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node. Always succeeds and assigns the next id.
    pub fn add_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.topology.add_node(id);
        self.nodes.insert(
            id,
            NodeEntry {
                node: Node { id, data },
                index,
            },
        );

        trace!(node = %id, "node added");
        self.listeners.fire(GraphChange::NodeAdded(id));
        id
    }

    /// Remove a node and, before it, every edge incident to it.
    ///
    /// Returns false (and does nothing) if the node is not in the graph.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.remove_node_with(id, &mut NoHook)
    }

    pub(crate) fn remove_node_with(&mut self, id: NodeId, hook: &mut dyn RemovalHook) -> bool {
        let Some(entry) = self.nodes.remove(&id) else {
            return false;
        };

        for edge in self.incident_edges_of(entry.index) {
            self.remove_edge_with(edge, hook);
        }
        self.topology.remove_node(entry.index);

        trace!(node = %id, "node removed");
        self.listeners.fire(GraphChange::NodeRemoved(id));
        hook.node_removed(&entry.node);
        true
    }

    /// Remove every edge incident to `id` but keep the node itself.
    ///
    /// Returns false if the node is not in the graph.
    pub fn detach_node(&mut self, id: NodeId) -> bool {
        self.detach_node_with(id, &mut NoHook)
    }

    pub(crate) fn detach_node_with(&mut self, id: NodeId, hook: &mut dyn RemovalHook) -> bool {
        let Some(index) = self.nodes.get(&id).map(|entry| entry.index) else {
            return false;
        };

        for edge in self.incident_edges_of(index) {
            self.remove_edge_with(edge, hook);
        }

        self.listeners.fire(GraphChange::NodeDetached(id));
        true
    }

    /// Remove every node for which `keep` returns false.
    pub fn filter_nodes<F>(&mut self, keep: F)
    where
        F: FnMut(&Node) -> bool,
    {
        self.filter_nodes_with(keep, &mut NoHook);
    }

    pub(crate) fn filter_nodes_with<F>(&mut self, mut keep: F, hook: &mut dyn RemovalHook)
    where
        F: FnMut(&Node) -> bool,
    {
        let doomed: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|entry| !keep(&entry.node))
            .map(|entry| entry.node.id)
            .collect();

        for id in doomed {
            self.remove_node_with(id, hook);
        }
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).map(|entry| &entry.node)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate nodes in id (insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values().map(|entry| &entry.node)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes connected to `id` by an edge in either direction, in id order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|entry| {
                self.topology
                    .neighbors_undirected(entry.index)
                    .filter_map(|n| self.topology.node_weight(n).copied())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add a directed edge.
    ///
    /// Fails with [`Error::InvalidReference`] if either endpoint is not in
    /// the graph; in that case nothing changes and no listener fires.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, data: EdgeData) -> Result<EdgeId> {
        let (Some(source_entry), Some(target_entry)) =
            (self.nodes.get(&source), self.nodes.get(&target))
        else {
            warn!(%source, %target, "rejected edge with unknown endpoint");
            return Err(Error::InvalidReference {
                from: source,
                to: target,
            });
        };
        let (source_index, target_index) = (source_entry.index, target_entry.index);

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self.topology.add_edge(source_index, target_index, id);
        self.edges.insert(
            id,
            EdgeEntry {
                edge: Edge {
                    id,
                    source,
                    target,
                    data,
                },
                index,
            },
        );
        self.adjacency.entry((source, target)).or_default().push(id);

        trace!(edge = %id, %source, %target, "edge added");
        self.listeners.fire(GraphChange::EdgeAdded(id));
        Ok(id)
    }

    /// Remove an edge.
    ///
    /// Returns false (and does nothing) if the edge is not in the graph.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        self.remove_edge_with(id, &mut NoHook)
    }

    pub(crate) fn remove_edge_with(&mut self, id: EdgeId, hook: &mut dyn RemovalHook) -> bool {
        let Some(entry) = self.edges.remove(&id) else {
            return false;
        };

        self.topology.remove_edge(entry.index);
        let key = (entry.edge.source, entry.edge.target);
        if let Some(bucket) = self.adjacency.get_mut(&key) {
            bucket.retain(|edge| *edge != id);
            if bucket.is_empty() {
                self.adjacency.remove(&key);
            }
        }

        trace!(edge = %id, "edge removed");
        self.listeners.fire(GraphChange::EdgeRemoved(id));
        hook.edge_removed(&entry.edge);
        true
    }

    /// Remove every edge for which `keep` returns false.
    pub fn filter_edges<F>(&mut self, keep: F)
    where
        F: FnMut(&Edge) -> bool,
    {
        self.filter_edges_with(keep, &mut NoHook);
    }

    pub(crate) fn filter_edges_with<F>(&mut self, mut keep: F, hook: &mut dyn RemovalHook)
    where
        F: FnMut(&Edge) -> bool,
    {
        let doomed: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|entry| !keep(&entry.edge))
            .map(|entry| entry.edge.id)
            .collect();

        for id in doomed {
            self.remove_edge_with(id, hook);
        }
    }

    /// Edges from `source` to `target`, in insertion order. Empty if none.
    pub fn edges_between(&self, source: NodeId, target: NodeId) -> &[EdgeId] {
        self.adjacency
            .get(&(source, target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Get an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id).map(|entry| &entry.edge)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    /// Iterate edges in id (insertion) order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values().map(|entry| &entry.edge)
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges with `id` as source or target, in id order.
    pub fn incident_edges(&self, id: NodeId) -> Vec<EdgeId> {
        self.nodes
            .get(&id)
            .map(|entry| self.incident_edges_of(entry.index))
            .unwrap_or_default()
    }

    fn incident_edges_of(&self, index: NodeIndex) -> Vec<EdgeId> {
        // A self-loop shows up in both directions.
        self.topology
            .edges_directed(index, Direction::Outgoing)
            .chain(self.topology.edges_directed(index, Direction::Incoming))
            .map(|edge| *edge.weight())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener notified after every structural change.
    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GraphChange) + Send + 'static,
    {
        self.listeners.add(Box::new(listener) as ChangeListener)
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
