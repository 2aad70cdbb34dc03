//! ForceDirectedLayout - the physics engine.
//!
//! Owns the graph and a simulation context holding exactly one point per
//! live node and one spring per live edge. Each step runs three force passes
//! that only add to the force accumulators, then integrates velocity (which
//! clears the accumulators) and position:
//!
//! 1. repulsion between every unordered pair of points (Coulomb analogy)
//! 2. spring force along every edge (Hooke analogy)
//! 3. a pull toward the origin proportional to `repulsion / 50`
//!
//! The repulsion pass is quadratic in the number of points; the engine is
//! meant for small, interactive graphs.

use std::collections::{BTreeMap, btree_map::Entry};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use super::config::{LayoutConfig, SchedulerConfig};
use crate::error::{Error, Result};
use crate::graph::{
    Edge, EdgeData, EdgeId, Graph, GraphChange, ListenerId, Node, NodeData, NodeId, RemovalHook,
};
use crate::physics::{Point, Spring, Vector};
use crate::spatial::{BoundingBox, Nearest};

/// Offset added to pair distance in the repulsion pass. Keeps the magnitude
/// finite at zero distance; coincident points have no direction between them
/// and receive no repulsion.
pub const REPULSION_EPSILON: f64 = 0.1;

/// `repulsion / CENTRE_PULL_DIVISOR` scales the pull toward the origin.
const CENTRE_PULL_DIVISOR: f64 = 50.0;

fn valid_rest_length(rest_length: f64) -> bool {
    rest_length >= 0.0 && rest_length.is_finite()
}

/// Points and springs reachable from one layout's graph.
#[derive(Debug, Default)]
struct Simulation {
    points: BTreeMap<NodeId, Point>,
    springs: BTreeMap<EdgeId, Spring>,
    /// Node pairs that lost their force-carrying spring and whose remaining
    /// edges need their springs rebuilt.
    orphaned_pairs: Vec<(NodeId, NodeId)>,
}

impl RemovalHook for Simulation {
    fn edge_removed(&mut self, edge: &Edge) {
        match self.springs.remove(&edge.id) {
            Some(spring) if !spring.is_degenerate() => {
                self.orphaned_pairs.push((edge.source, edge.target));
            }
            _ => {}
        }
    }

    fn node_removed(&mut self, node: &Node) {
        self.points.remove(&node.id);
    }
}

/// Force-directed layout over an owned [`Graph`].
///
/// All structural mutation goes through the layout so that its point and
/// spring caches always mirror the graph one-to-one.
pub struct ForceDirectedLayout {
    graph: Graph,
    sim: Simulation,
    config: LayoutConfig,
    rng: StdRng,
}

impl ForceDirectedLayout {
    /// Create a layout over an empty graph.
    pub fn new(config: LayoutConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            graph: Graph::new(),
            sim: Simulation::default(),
            config,
            rng,
        }
    }

    /// Create a layout over an existing graph, placing every node and
    /// materializing every edge's spring.
    ///
    /// Fails with [`Error::InvalidMass`] if any node carries a mass that
    /// cannot back a point, or [`Error::InvalidRestLength`] if any edge has a
    /// negative or non-finite rest length.
    pub fn with_graph(graph: Graph, config: LayoutConfig) -> Result<Self> {
        if let Some(node) = graph.nodes().find(|n| !(n.data.mass > 0.0 && n.data.mass.is_finite())) {
            return Err(Error::InvalidMass(node.data.mass));
        }
        if let Some(edge) = graph.edges().find(|e| !valid_rest_length(e.data.rest_length)) {
            return Err(Error::InvalidRestLength(edge.data.rest_length));
        }

        let mut layout = Self::new(config);
        layout.graph = graph;

        let nodes: Vec<NodeId> = layout.graph.nodes().map(|n| n.id).collect();
        let edges: Vec<EdgeId> = layout.graph.edges().map(|e| e.id).collect();
        for id in nodes {
            layout.get_point(id);
        }
        for id in edges {
            layout.get_spring(id);
        }

        debug!(
            nodes = layout.sim.points.len(),
            springs = layout.sim.springs.len(),
            "layout attached to graph"
        );
        Ok(layout)
    }

    // =========================================================================
    // Structural Mutation
    // =========================================================================

    /// Add a node and place its point.
    ///
    /// Fails with [`Error::InvalidMass`], leaving the graph unchanged, if
    /// `data.mass` is not positive and finite.
    pub fn add_node(&mut self, data: NodeData) -> Result<NodeId> {
        if !(data.mass > 0.0 && data.mass.is_finite()) {
            return Err(Error::InvalidMass(data.mass));
        }
        let id = self.graph.add_node(data);
        self.get_point(id);
        Ok(id)
    }

    /// Add an edge and materialize its spring.
    ///
    /// Fails with [`Error::InvalidRestLength`] if `data.rest_length` is
    /// negative or non-finite, and with [`Error::InvalidReference`] if either
    /// endpoint is not in the graph. Either way the graph is unchanged.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, data: EdgeData) -> Result<EdgeId> {
        if !valid_rest_length(data.rest_length) {
            return Err(Error::InvalidRestLength(data.rest_length));
        }
        let id = self.graph.add_edge(source, target, data)?;
        self.get_spring(id);
        Ok(id)
    }

    /// Remove a node with all its edges, evicting their springs and its point.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let removed = self.graph.remove_node_with(id, &mut self.sim);
        self.rebuild_orphaned_springs();
        removed
    }

    /// Remove an edge, evicting its spring.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let removed = self.graph.remove_edge_with(id, &mut self.sim);
        self.rebuild_orphaned_springs();
        removed
    }

    /// Remove every edge of a node, keeping the node.
    pub fn detach_node(&mut self, id: NodeId) -> bool {
        let detached = self.graph.detach_node_with(id, &mut self.sim);
        self.rebuild_orphaned_springs();
        detached
    }

    /// Remove every node for which `keep` returns false.
    pub fn filter_nodes<F>(&mut self, keep: F)
    where
        F: FnMut(&Node) -> bool,
    {
        self.graph.filter_nodes_with(keep, &mut self.sim);
        self.rebuild_orphaned_springs();
    }

    /// Remove every edge for which `keep` returns false.
    pub fn filter_edges<F>(&mut self, keep: F)
    where
        F: FnMut(&Edge) -> bool,
    {
        self.graph.filter_edges_with(keep, &mut self.sim);
        self.rebuild_orphaned_springs();
    }

    /// Register a graph change listener. See [`Graph::add_listener`].
    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GraphChange) + Send + 'static,
    {
        self.graph.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.graph.remove_listener(id)
    }

    /// Move a node's point, keeping its velocity. Returns false if the node
    /// has no point.
    pub fn set_position(&mut self, id: NodeId, position: Vector) -> bool {
        match self.sim.points.get_mut(&id) {
            Some(point) => {
                point.set_position(position);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Points and Springs
    // =========================================================================

    /// The node's point, created at a random position on first access.
    ///
    /// Returns `None` if the node is not in the graph.
    pub fn get_point(&mut self, node: NodeId) -> Option<&Point> {
        let mass = self.graph.node(node)?.data.mass;
        match self.sim.points.entry(node) {
            Entry::Occupied(entry) => Some(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let point = Point::new(Vector::random(&mut self.rng), mass).ok()?;
                Some(&*entry.insert(point))
            }
        }
    }

    /// The edge's spring, created on first access.
    ///
    /// Parallel and reverse edges share one force-carrying spring: if another
    /// edge between the same nodes already has a spring, this edge gets a
    /// degenerate spring over the same endpoints (swapped for the reverse
    /// direction). Otherwise it gets a full spring with the edge's rest length
    /// and the layout's stiffness.
    ///
    /// Returns `None` if the edge is not in the graph.
    pub fn get_spring(&mut self, edge: EdgeId) -> Option<&Spring> {
        if self.sim.springs.contains_key(&edge) {
            return self.sim.springs.get(&edge);
        }

        let (source, target, rest_length) = {
            let e = self.graph.edge(edge)?;
            (e.source, e.target, e.data.rest_length)
        };

        let spring = if let Some(existing) = self.materialized_spring(source, target, edge) {
            Spring::degenerate(existing.point1(), existing.point2())
        } else if let Some(existing) = self.materialized_spring(target, source, edge) {
            Spring::degenerate(existing.point2(), existing.point1())
        } else {
            self.get_point(source)?;
            self.get_point(target)?;
            Spring::new(source, target, rest_length, self.config.stiffness)
        };

        Some(&*self.sim.springs.entry(edge).or_insert(spring))
    }

    /// First spring already assigned to an edge `source → target` other than
    /// `skip`, in insertion order.
    fn materialized_spring(&self, source: NodeId, target: NodeId, skip: EdgeId) -> Option<Spring> {
        self.graph
            .edges_between(source, target)
            .iter()
            .filter(|id| **id != skip)
            .find_map(|id| self.sim.springs.get(id).copied())
    }

    /// Hand the force of a removed spring to the oldest surviving edge of the
    /// same node pair.
    fn rebuild_orphaned_springs(&mut self) {
        let pairs = std::mem::take(&mut self.sim.orphaned_pairs);
        for (a, b) in pairs {
            let mut survivors: Vec<EdgeId> = self
                .graph
                .edges_between(a, b)
                .iter()
                .chain(self.graph.edges_between(b, a))
                .copied()
                .collect();
            if survivors.is_empty() {
                continue;
            }
            survivors.sort_unstable();
            survivors.dedup();

            for id in &survivors {
                self.sim.springs.remove(id);
            }
            for id in survivors {
                self.get_spring(id);
            }
        }
    }

    /// The node's point, if it has one.
    pub fn point(&self, node: NodeId) -> Option<&Point> {
        self.sim.points.get(&node)
    }

    /// The edge's spring, if it has one.
    pub fn spring(&self, edge: EdgeId) -> Option<&Spring> {
        self.sim.springs.get(&edge)
    }

    pub fn point_count(&self) -> usize {
        self.sim.points.len()
    }

    pub fn spring_count(&self) -> usize {
        self.sim.springs.len()
    }

    // =========================================================================
    // Force Passes
    // =========================================================================

    /// Repulsion between every unordered pair of distinct points:
    /// `repulsion / (distance + ε)²` along the line between them, equal and
    /// opposite on the two points.
    pub fn apply_coulombs_law(&mut self) {
        let positions: Vec<Vector> = self.sim.points.values().map(Point::position).collect();
        let mut forces = vec![Vector::ZERO; positions.len()];

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let d = positions[i].subtract(positions[j]);
                let distance = d.magnitude() + REPULSION_EPSILON;
                let f = d
                    .normalize()
                    .scale(self.config.repulsion / (distance * distance));
                forces[i].accumulate(f);
                forces[j].accumulate(-f);
            }
        }

        for (point, force) in self.sim.points.values_mut().zip(forces) {
            point.apply_force(force);
        }
    }

    /// Spring force along every edge's spring.
    pub fn apply_hookes_law(&mut self) {
        let Simulation {
            points, springs, ..
        } = &mut self.sim;

        for spring in springs.values().filter(|s| !s.is_degenerate()) {
            let (Some(p1), Some(p2)) = (points.get(&spring.point1()), points.get(&spring.point2()))
            else {
                continue;
            };
            let (f1, f2) = spring.forces(p1.position(), p2.position());

            if let Some(p1) = points.get_mut(&spring.point1()) {
                p1.apply_force(f1);
            }
            if let Some(p2) = points.get_mut(&spring.point2()) {
                p2.apply_force(f2);
            }
        }
    }

    /// Pull every point toward the origin, proportionally to its distance.
    pub fn attract_to_centre(&mut self) {
        let strength = self.config.repulsion / CENTRE_PULL_DIVISOR;
        for point in self.sim.points.values_mut() {
            let pull = point.position().scale(-strength);
            point.apply_force(pull);
        }
    }

    /// `velocity = (velocity + force * dt) * damping`, then clear forces.
    pub fn update_velocity(&mut self, dt: f64) {
        let damping = self.config.damping;
        for point in self.sim.points.values_mut() {
            point.integrate_velocity(dt, damping);
        }
    }

    /// `position = position + velocity * dt`.
    pub fn update_position(&mut self, dt: f64) {
        for point in self.sim.points.values_mut() {
            point.integrate_position(dt);
        }
    }

    /// One full simulation step: the three passes, then integration.
    pub fn step(&mut self, velocity_dt: f64, position_dt: f64) {
        self.apply_coulombs_law();
        self.apply_hookes_law();
        self.attract_to_centre();
        self.update_velocity(velocity_dt);
        self.update_position(position_dt);
    }

    /// Step until total energy drops below the threshold.
    ///
    /// Returns the number of steps taken, or `None` if the layout had not
    /// settled after `max_steps`.
    pub fn run_until_converged(&mut self, settings: &SchedulerConfig, max_steps: usize) -> Option<usize> {
        for n in 1..=max_steps {
            self.step(settings.velocity_time_step, settings.position_time_step);
            if self.total_energy() < settings.energy_threshold {
                return Some(n);
            }
        }
        None
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sum of `0.5 * m * |v|²` over all points; zero for an empty graph.
    pub fn total_energy(&self) -> f64 {
        self.sim.points.values().map(Point::kinetic_energy).sum()
    }

    /// Padded box around every point. See [`BoundingBox::enclosing`].
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::enclosing(self.sim.points.values().map(Point::position))
    }

    /// Closest point to `position`, or [`Nearest::NONE`] on an empty graph.
    pub fn nearest(&self, position: Vector) -> Nearest {
        Nearest::search(
            self.sim.points.iter().map(|(id, point)| (*id, point)),
            position,
        )
    }

    /// Visit every node with its point.
    pub fn each_node<F>(&self, mut f: F)
    where
        F: FnMut(&Node, &Point),
    {
        for node in self.graph.nodes() {
            if let Some(point) = self.sim.points.get(&node.id) {
                f(node, point);
            }
        }
    }

    /// Visit every edge with its spring.
    pub fn each_edge<F>(&self, mut f: F)
    where
        F: FnMut(&Edge, &Spring),
    {
        for edge in self.graph.edges() {
            if let Some(spring) = self.sim.springs.get(&edge.id) {
                f(edge, spring);
            }
        }
    }

    /// Visit every spring, degenerate ones included.
    pub fn each_spring<F>(&self, mut f: F)
    where
        F: FnMut(&Spring),
    {
        for spring in self.sim.springs.values() {
            f(spring);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn stiffness(&self) -> f64 {
        self.config.stiffness
    }

    pub fn repulsion(&self) -> f64 {
        self.config.repulsion
    }

    pub fn damping(&self) -> f64 {
        self.config.damping
    }
}

impl Default for ForceDirectedLayout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded(seed: u64) -> ForceDirectedLayout {
        ForceDirectedLayout::new(LayoutConfig {
            seed: Some(seed),
            ..LayoutConfig::default()
        })
    }

    fn force_of(layout: &ForceDirectedLayout, id: NodeId) -> Vector {
        layout.point(id).unwrap().force()
    }

    #[test]
    fn test_add_node_places_point() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::new().mass(2.0)).unwrap();

        let point = layout.point(a).unwrap();
        assert_eq!(point.mass(), 2.0);
        assert!((-5.0..5.0).contains(&point.position().x));
        assert!((-5.0..5.0).contains(&point.position().y));
        assert_eq!(layout.point_count(), 1);
    }

    #[test]
    fn test_add_node_rejects_invalid_mass() {
        let mut layout = seeded(1);
        assert_eq!(
            layout.add_node(NodeData::new().mass(0.0)),
            Err(Error::InvalidMass(0.0))
        );
        assert_eq!(layout.graph().node_count(), 0);
        assert_eq!(layout.point_count(), 0);
    }

    #[test]
    fn test_get_point_is_idempotent() {
        let mut layout = seeded(3);
        let a = layout.add_node(NodeData::default()).unwrap();

        let first = *layout.get_point(a).unwrap();
        let second = *layout.get_point(a).unwrap();
        assert_eq!(first, second);
        assert!(layout.get_point(NodeId(99)).is_none());
    }

    #[test]
    fn test_with_graph_materializes_everything() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeData::default());
        let b = graph.add_node(NodeData::default());
        let e1 = graph.add_edge(a, b, EdgeData::default()).unwrap();
        let e2 = graph.add_edge(a, b, EdgeData::default()).unwrap();

        let layout = ForceDirectedLayout::with_graph(graph, LayoutConfig::default()).unwrap();
        assert_eq!(layout.point_count(), 2);
        assert_eq!(layout.spring_count(), 2);
        assert!(!layout.spring(e1).unwrap().is_degenerate());
        assert!(layout.spring(e2).unwrap().is_degenerate());
    }

    #[test]
    fn test_with_graph_rejects_bad_mass() {
        let mut graph = Graph::new();
        graph.add_node(NodeData::new().mass(-1.0));
        assert!(matches!(
            ForceDirectedLayout::with_graph(graph, LayoutConfig::default()),
            Err(Error::InvalidMass(_))
        ));
    }

    #[test]
    fn test_add_edge_invalid_reference() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let err = layout
            .add_edge(a, NodeId(5), EdgeData::default())
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidReference {
                from: a,
                to: NodeId(5)
            }
        );
        assert_eq!(layout.spring_count(), 0);
    }

    #[test]
    fn test_add_edge_rejects_negative_rest_length() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();

        assert_eq!(
            layout.add_edge(a, b, EdgeData::new().rest_length(-5.0)),
            Err(Error::InvalidRestLength(-5.0))
        );
        assert!(matches!(
            layout.add_edge(a, b, EdgeData::new().rest_length(f64::INFINITY)),
            Err(Error::InvalidRestLength(_))
        ));
        assert_eq!(layout.graph().edge_count(), 0);
        assert_eq!(layout.spring_count(), 0);

        let e = layout
            .add_edge(a, b, EdgeData::new().rest_length(0.0))
            .unwrap();
        assert_eq!(layout.spring(e).unwrap().rest_length(), 0.0);
    }

    #[test]
    fn test_with_graph_rejects_negative_rest_length() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeData::default());
        let b = graph.add_node(NodeData::default());
        graph
            .add_edge(a, b, EdgeData::new().rest_length(-1.0))
            .unwrap();

        assert_eq!(
            ForceDirectedLayout::with_graph(graph, LayoutConfig::default()).err(),
            Some(Error::InvalidRestLength(-1.0))
        );
    }

    #[test]
    fn test_full_spring_uses_edge_rest_length_and_stiffness() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        let e = layout
            .add_edge(a, b, EdgeData::new().rest_length(7.5))
            .unwrap();

        let spring = layout.spring(e).unwrap();
        assert_eq!((spring.point1(), spring.point2()), (a, b));
        assert_eq!(spring.rest_length(), 7.5);
        assert_eq!(spring.stiffness(), 500.0);
    }

    #[test]
    fn test_parallel_edges_share_one_force_carrying_spring() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        let e1 = layout.add_edge(a, b, EdgeData::default()).unwrap();
        let e2 = layout.add_edge(a, b, EdgeData::default()).unwrap();
        let e3 = layout.add_edge(a, b, EdgeData::default()).unwrap();

        assert!(!layout.spring(e1).unwrap().is_degenerate());
        for e in [e2, e3] {
            let spring = layout.spring(e).unwrap();
            assert!(spring.is_degenerate());
            assert_eq!(spring.rest_length(), 0.0);
            assert_eq!((spring.point1(), spring.point2()), (a, b));
        }

        let mut force_carrying = 0;
        layout.each_spring(|s| {
            if !s.is_degenerate() {
                force_carrying += 1;
            }
        });
        assert_eq!(force_carrying, 1);
    }

    #[test]
    fn test_reverse_edge_gets_swapped_degenerate_spring() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        layout.add_edge(a, b, EdgeData::default()).unwrap();
        let back = layout.add_edge(b, a, EdgeData::default()).unwrap();

        let spring = layout.spring(back).unwrap();
        assert!(spring.is_degenerate());
        assert_eq!((spring.point1(), spring.point2()), (b, a));
    }

    #[test]
    fn test_parallel_edges_do_not_change_hooke_force() {
        let build = |parallel: usize| {
            let mut layout = seeded(9);
            let a = layout.add_node(NodeData::default()).unwrap();
            let b = layout.add_node(NodeData::default()).unwrap();
            for _ in 0..parallel {
                layout
                    .add_edge(a, b, EdgeData::new().rest_length(3.0))
                    .unwrap();
            }
            layout.add_edge(b, a, EdgeData::new().rest_length(3.0)).unwrap();
            layout.set_position(a, Vector::new(0.0, 0.0));
            layout.set_position(b, Vector::new(10.0, 0.0));
            layout.apply_hookes_law();
            (force_of(&layout, a), force_of(&layout, b))
        };

        let single = build(1);
        assert_eq!(single.0, Vector::new(1750.0, 0.0));
        assert_eq!(build(4), single);
    }

    #[test]
    fn test_removing_force_carrying_edge_promotes_survivor() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        let e1 = layout.add_edge(a, b, EdgeData::new().rest_length(2.0)).unwrap();
        let back = layout.add_edge(b, a, EdgeData::new().rest_length(4.0)).unwrap();
        let e3 = layout.add_edge(a, b, EdgeData::new().rest_length(6.0)).unwrap();

        assert!(layout.remove_edge(e1));
        assert!(layout.spring(e1).is_none());

        // `back` is the oldest survivor and takes over the force.
        let spring = *layout.spring(back).unwrap();
        assert!(!spring.is_degenerate());
        assert_eq!((spring.point1(), spring.point2()), (b, a));
        assert_eq!(spring.rest_length(), 4.0);

        let spring = *layout.spring(e3).unwrap();
        assert!(spring.is_degenerate());
        assert_eq!((spring.point1(), spring.point2()), (a, b));
    }

    #[test]
    fn test_removing_degenerate_edge_keeps_springs() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        let e1 = layout.add_edge(a, b, EdgeData::default()).unwrap();
        let e2 = layout.add_edge(a, b, EdgeData::default()).unwrap();

        let before = *layout.spring(e1).unwrap();
        layout.remove_edge(e2);
        assert_eq!(*layout.spring(e1).unwrap(), before);
        assert_eq!(layout.spring_count(), 1);
    }

    #[test]
    fn test_remove_node_evicts_point_and_springs() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        let c = layout.add_node(NodeData::default()).unwrap();
        let ab = layout.add_edge(a, b, EdgeData::default()).unwrap();
        let bc = layout.add_edge(b, c, EdgeData::default()).unwrap();
        let ca = layout.add_edge(c, a, EdgeData::default()).unwrap();

        assert!(layout.remove_node(b));
        assert!(!layout.remove_node(b));

        assert!(layout.point(b).is_none());
        assert!(layout.spring(ab).is_none());
        assert!(layout.spring(bc).is_none());
        assert!(layout.spring(ca).is_some());
        assert_eq!(layout.point_count(), 2);
        assert_eq!(layout.spring_count(), 1);
    }

    #[test]
    fn test_filter_and_detach_keep_caches_in_sync() {
        let mut layout = seeded(1);
        let ids: Vec<_> = (1..=4)
            .map(|m| layout.add_node(NodeData::new().mass(m as f64)).unwrap())
            .collect();
        layout.add_edge(ids[0], ids[1], EdgeData::default()).unwrap();
        layout.add_edge(ids[2], ids[3], EdgeData::default()).unwrap();
        layout.add_edge(ids[3], ids[0], EdgeData::default()).unwrap();

        layout.detach_node(ids[0]);
        assert_eq!(layout.spring_count(), 1);
        assert_eq!(layout.point_count(), 4);

        layout.filter_nodes(|node| node.data.mass < 3.5);
        assert_eq!(layout.point_count(), 3);
        assert_eq!(layout.spring_count(), 0);

        layout.filter_edges(|_| false);
        assert_eq!(layout.graph().edge_count(), 0);
    }

    #[test]
    fn test_coulomb_pushes_pair_apart() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        layout.set_position(a, Vector::new(0.0, 0.0));
        layout.set_position(b, Vector::new(1.9, 0.0));

        layout.apply_coulombs_law();

        // 500 / (1.9 + 0.1)^2 = 125
        assert!((force_of(&layout, a).x + 125.0).abs() < 1e-9);
        assert!((force_of(&layout, b).x - 125.0).abs() < 1e-9);
        assert_eq!(force_of(&layout, a).y, 0.0);
    }

    #[test]
    fn test_coulomb_ignores_coincident_points() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        layout.set_position(a, Vector::new(1.0, 1.0));
        layout.set_position(b, Vector::new(1.0, 1.0));

        layout.apply_coulombs_law();
        assert_eq!(force_of(&layout, a), Vector::ZERO);
        assert_eq!(force_of(&layout, b), Vector::ZERO);
    }

    #[test]
    fn test_mass_scales_acceleration() {
        let mut layout = seeded(1);
        let light = layout.add_node(NodeData::new().mass(1.0)).unwrap();
        let heavy = layout.add_node(NodeData::new().mass(4.0)).unwrap();
        layout.set_position(light, Vector::new(-1.9, 0.0));
        layout.set_position(heavy, Vector::new(0.0, 0.0));

        layout.apply_coulombs_law();
        let ratio = force_of(&layout, light).x / force_of(&layout, heavy).x;
        assert!((ratio + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_attract_to_centre() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        layout.set_position(a, Vector::new(3.0, -2.0));

        layout.attract_to_centre();
        // repulsion / 50 = 10
        assert_eq!(force_of(&layout, a), Vector::new(-30.0, 20.0));
    }

    #[test]
    fn test_integration_resets_force() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        layout.set_position(a, Vector::new(1.0, 0.0));

        layout.attract_to_centre();
        layout.update_velocity(0.1);
        // (0 + -10 * 0.1) * 0.5
        assert_eq!(layout.point(a).unwrap().velocity(), Vector::new(-0.5, 0.0));
        assert_eq!(force_of(&layout, a), Vector::ZERO);

        layout.update_position(2.0);
        assert_eq!(layout.point(a).unwrap().position(), Vector::new(0.0, 0.0));

        assert_eq!(layout.total_energy(), 0.125);
    }

    #[test]
    fn test_empty_layout_queries() {
        let layout = seeded(1);
        assert_eq!(layout.total_energy(), 0.0);
        assert_eq!(layout.bounding_box(), BoundingBox::default());
        assert!(layout.nearest(Vector::new(3.0, 3.0)).is_none());
        assert_eq!(layout.nearest(Vector::ZERO).distance, -1.0);
    }

    #[test]
    fn test_bounding_box_covers_points() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        layout.set_position(a, Vector::new(-20.0, 1.0));
        layout.set_position(b, Vector::new(30.0, 8.0));

        let bb = layout.bounding_box();
        assert!(bb.contains(Vector::new(-20.0, 1.0)));
        assert!(bb.contains(Vector::new(30.0, 8.0)));
        assert!(bb.bottom_left().x < -20.0);
        assert!(bb.top_right().y > 8.0);
        // Floor still applies on the y axis.
        assert!(bb.bottom_left().y < -2.0);
    }

    #[test]
    fn test_each_node_and_edge_enumerate_live_entities() {
        let mut layout = seeded(1);
        let a = layout.add_node(NodeData::new().label("a")).unwrap();
        let b = layout.add_node(NodeData::new().label("b")).unwrap();
        let e = layout.add_edge(a, b, EdgeData::default()).unwrap();
        layout.add_edge(b, a, EdgeData::default()).unwrap();

        let mut labels = Vec::new();
        layout.each_node(|node, point| {
            assert_eq!(Some(point), layout.point(node.id));
            labels.push(node.data.label.clone().unwrap_or_default());
        });
        assert_eq!(labels, vec!["a", "b"]);

        let mut edges = Vec::new();
        layout.each_edge(|edge, spring| edges.push((edge.id, spring.is_degenerate())));
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], (e, false));
        assert!(edges[1].1);
    }

    #[test]
    fn test_two_node_spring_converges_to_rest_length() {
        let settings = SchedulerConfig::default();
        for seed in 0..8 {
            let mut layout = ForceDirectedLayout::new(LayoutConfig {
                repulsion: 1e-3,
                seed: Some(seed),
                ..LayoutConfig::default()
            });
            let a = layout.add_node(NodeData::default()).unwrap();
            let b = layout.add_node(NodeData::default()).unwrap();
            layout
                .add_edge(a, b, EdgeData::new().rest_length(50.0))
                .unwrap();

            let steps = layout.run_until_converged(&settings, 10_000);
            assert!(steps.is_some(), "seed {seed} did not converge");

            let distance = layout
                .point(a)
                .unwrap()
                .position()
                .distance(layout.point(b).unwrap().position());
            assert!(
                (distance - 50.0).abs() < 2.5,
                "seed {seed}: distance {distance} not within 5% of 50"
            );
        }
    }

    #[test]
    fn test_small_cycle_converges() {
        let mut layout = seeded(11);
        let ids: Vec<_> = (0..4)
            .map(|_| layout.add_node(NodeData::default()).unwrap())
            .collect();
        for i in 0..4 {
            layout
                .add_edge(ids[i], ids[(i + 1) % 4], EdgeData::default())
                .unwrap();
        }

        let steps = layout.run_until_converged(&SchedulerConfig::default(), 5_000);
        assert!(steps.is_some());
        assert!(layout.total_energy() < 0.01);
    }

    proptest! {
        #[test]
        fn prop_nearest_matches_brute_force(
            coords in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 1..20),
            qx in -150.0f64..150.0,
            qy in -150.0f64..150.0,
        ) {
            let mut layout = seeded(5);
            let mut placed = Vec::new();
            for (x, y) in coords {
                let id = layout.add_node(NodeData::default()).unwrap();
                layout.set_position(id, Vector::new(x, y));
                placed.push((id, Vector::new(x, y)));
            }
            let query = Vector::new(qx, qy);

            let best = placed
                .iter()
                .map(|(_, p)| p.distance(query))
                .fold(f64::INFINITY, f64::min);
            let hit = layout.nearest(query);

            prop_assert!(hit.node.is_some());
            prop_assert_eq!(hit.distance, best);
            let hit_pos = hit.point.map(|p| p.position());
            prop_assert_eq!(hit_pos.map(|p| p.distance(query)), Some(best));
        }
    }
}
