//! Structural change notification.
//!
//! Two channels, kept apart on purpose:
//! - `Listeners`: an ordered list of external observers notified after every
//!   structural mutation has been fully applied.
//! - `RemovalHook`: a crate-private callback through which the layout engine
//!   evicts the point or spring of a removed node or edge. It is passed into
//!   the removal call by the owner of the caches and cannot be registered from
//!   outside the crate.

use super::{Edge, EdgeId, Node, NodeId};

/// A structural mutation that has just been applied to a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphChange {
    NodeAdded(NodeId),
    EdgeAdded(EdgeId),
    EdgeRemoved(EdgeId),
    NodeRemoved(NodeId),
    /// All incident edges of this node were removed by `detach_node`.
    NodeDetached(NodeId),
}

/// Handle returned by listener registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type ChangeListener = Box<dyn FnMut(&GraphChange) + Send>;

/// Ordered list of change listeners.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(ListenerId, ChangeListener)>,
    next_id: u64,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Notify every listener in registration order.
    pub(crate) fn fire(&mut self, change: GraphChange) {
        for (_, listener) in &mut self.entries {
            listener(&change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Cache eviction callback invoked after a node or edge has left the graph.
pub(crate) trait RemovalHook {
    fn edge_removed(&mut self, edge: &Edge);
    fn node_removed(&mut self, node: &Node);
}

/// Hook for graphs that have no simulation attached.
pub(crate) struct NoHook;

impl RemovalHook for NoHook {
    fn edge_removed(&mut self, _edge: &Edge) {}
    fn node_removed(&mut self, _node: &Node) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            listeners.add(Box::new(move |change| {
                log.lock().unwrap().push((tag, *change));
            }));
        }

        listeners.fire(GraphChange::NodeAdded(NodeId(0)));

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                ("first", GraphChange::NodeAdded(NodeId(0))),
                ("second", GraphChange::NodeAdded(NodeId(0))),
            ]
        );
    }

    #[test]
    fn test_remove_listener() {
        let mut listeners = Listeners::default();
        let a = listeners.add(Box::new(|_| {}));
        let b = listeners.add(Box::new(|_| {}));
        assert_ne!(a, b);

        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert_eq!(listeners.len(), 1);
    }
}
