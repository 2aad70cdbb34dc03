//! Forcegraph - force-directed graph layout
//!
//! Computes stable 2D positions for an arbitrary graph by simulating nodes
//! as charged particles connected by springs, damped and pulled toward the
//! origin until kinetic energy falls below a threshold. Usable as a plain
//! Rust library, and compiled to WebAssembly through the `ForceGraphWasm`
//! facade below.
//!
//! # Architecture
//!
//! - `graph`: directed multigraph on petgraph's StableGraph with change listeners
//! - `physics`: vectors, points and springs
//! - `layout`: the force passes, the step scheduler, and a tokio driver on native targets
//! - `spatial`: bounding boxes and nearest-point hit testing
//! - `render`: the drawing boundary a renderer implements

use std::time::Duration;

use tracing::warn;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod physics;
pub mod render;
pub mod spatial;

pub use error::{Error, Result};
pub use graph::{Edge, EdgeData, EdgeId, Graph, GraphChange, Node, NodeData, NodeId};
pub use layout::{
    ChangeFlag, ForceDirectedLayout, LayoutConfig, RunOptions, SchedulerConfig, SchedulerState,
    StepOutcome, StepScheduler,
};
#[cfg(not(target_arch = "wasm32"))]
pub use layout::LayoutDriver;
pub use physics::{Point, Spring, Vector};
pub use render::{Painter, paint};
pub use spatial::{BoundingBox, Nearest};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Layout engine exposed to JavaScript.
///
/// There is no timer on this side: JS calls `tick()` from its animation loop
/// while it returns true. Structural changes restart a settled layout on
/// their own.
#[wasm_bindgen]
pub struct ForceGraphWasm {
    layout: ForceDirectedLayout,
    scheduler: StepScheduler,
    changed: ChangeFlag,
    on_render: Option<js_sys::Function>,
    on_finished: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl ForceGraphWasm {
    /// Create an empty layout with default constants.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_configs(LayoutConfig::default(), SchedulerConfig::default())
    }

    /// Create an empty layout from partial config objects.
    ///
    /// Field names follow the Rust structs (`stiffness`, `seed`,
    /// `energy_threshold`). Missing fields and missing objects keep their
    /// defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(layout: JsValue, scheduler: JsValue) -> Result<ForceGraphWasm, JsValue> {
        let layout: LayoutConfig = if layout.is_undefined() || layout.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(layout)?
        };
        let scheduler: SchedulerConfig = if scheduler.is_undefined() || scheduler.is_null() {
            SchedulerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(scheduler)?
        };
        Ok(Self::from_configs(layout, scheduler))
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with the given mass.
    ///
    /// Returns the node ID, or None if the mass is not positive.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, mass: f64) -> Option<u32> {
        let result = self.layout.add_node(NodeData::new().mass(mass));
        self.after_mutation();
        result.ok().map(|id| id.0)
    }

    /// Add a node from a `{ mass, label }` object.
    #[wasm_bindgen(js_name = addNodeWithData)]
    pub fn add_node_with_data(&mut self, data: JsValue) -> Option<u32> {
        let data: NodeData = serde_wasm_bindgen::from_value(data).ok()?;
        let result = self.layout.add_node(data);
        self.after_mutation();
        result.ok().map(|id| id.0)
    }

    /// Remove a node and all its edges.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        let removed = self.layout.remove_node(NodeId(node_id));
        self.after_mutation();
        removed
    }

    /// Move a node, keeping its velocity.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f64, y: f64) -> bool {
        self.layout.set_position(NodeId(node_id), Vector::new(x, y))
    }

    /// Get the number of nodes in the graph.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.layout.graph().node_count() as u32
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge with the given spring rest length.
    ///
    /// Returns the edge ID, or None if source/target don't exist.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32, rest_length: f64) -> Option<u32> {
        let data = EdgeData::new().rest_length(rest_length);
        let result = self.layout.add_edge(NodeId(source), NodeId(target), data);
        self.after_mutation();
        result.ok().map(|id| id.0)
    }

    /// Add an edge from a `{ rest_length, weight, directional, label }` object.
    #[wasm_bindgen(js_name = addEdgeWithData)]
    pub fn add_edge_with_data(&mut self, source: u32, target: u32, data: JsValue) -> Option<u32> {
        let data: EdgeData = serde_wasm_bindgen::from_value(data).ok()?;
        let result = self.layout.add_edge(NodeId(source), NodeId(target), data);
        self.after_mutation();
        result.ok().map(|id| id.0)
    }

    /// Remove an edge by ID.
    ///
    /// Returns true if the edge existed and was removed.
    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        let removed = self.layout.remove_edge(EdgeId(edge_id));
        self.after_mutation();
        removed
    }

    /// Get the number of edges in the graph.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.layout.graph().edge_count() as u32
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Start converging. The first step runs immediately; keep calling
    /// `tick()` every `interval_ms` while it returns true.
    ///
    /// `tracked_box` seeds the smoothed bounding box as
    /// [min_x, min_y, max_x, max_y]; anything else starts from the default
    /// box.
    ///
    /// Returns false if already running.
    pub fn start(&mut self, interval_ms: f64, tracked_box: Option<Vec<f64>>) -> bool {
        let interval = Duration::try_from_secs_f64(interval_ms.max(0.0) / 1000.0).unwrap_or_default();
        let mut options = RunOptions::new(interval);
        if let Some(bounds) = tracked_box.as_deref().and_then(box_from_slice) {
            options = options.tracking(bounds);
        }

        self.changed.take();
        match self.scheduler.start(&mut self.layout, options) {
            Some(outcome) => {
                self.notify(outcome);
                true
            }
            None => false,
        }
    }

    /// Advance one step. Returns true while the layout is still moving.
    pub fn tick(&mut self) -> bool {
        let outcome = self.scheduler.step(&mut self.layout);
        self.notify(outcome);
        outcome == StepOutcome::Continue
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Called after every completed step.
    #[wasm_bindgen(js_name = setOnRender)]
    pub fn set_on_render(&mut self, callback: Option<js_sys::Function>) {
        self.on_render = callback;
    }

    /// Called once per run when the layout settles.
    #[wasm_bindgen(js_name = setOnFinished)]
    pub fn set_on_finished(&mut self, callback: Option<js_sys::Function>) {
        self.on_finished = callback;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Total kinetic energy of the simulation.
    #[wasm_bindgen(js_name = totalEnergy)]
    pub fn total_energy(&self) -> f64 {
        self.layout.total_energy()
    }

    /// Padded bounding box as [min_x, min_y, max_x, max_y].
    #[wasm_bindgen(js_name = boundingBox)]
    pub fn bounding_box(&self) -> Vec<f64> {
        box_to_vec(&self.layout.bounding_box())
    }

    /// Smoothed bounding box of the current run as [min_x, min_y, max_x, max_y].
    ///
    /// Returns None if the layout was never started.
    #[wasm_bindgen(js_name = trackedBox)]
    pub fn tracked_box(&self) -> Option<Vec<f64>> {
        self.scheduler.tracked_box().as_ref().map(box_to_vec)
    }

    /// Find the node closest to a point in simulation coordinates.
    ///
    /// Returns the node ID, or None if the graph is empty.
    pub fn nearest(&self, x: f64, y: f64) -> Option<u32> {
        self.layout.nearest(Vector::new(x, y)).node.map(|id| id.0)
    }

    /// Node IDs in the same order as `nodePositions`.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<u32> {
        let mut ids = Vec::with_capacity(self.layout.point_count());
        self.layout.each_node(|node, _| ids.push(node.id.0));
        ids
    }

    /// Node positions as [x0, y0, x1, y1, ...].
    #[wasm_bindgen(js_name = nodePositions)]
    pub fn node_positions(&self) -> Vec<f64> {
        let mut positions = Vec::with_capacity(self.layout.point_count() * 2);
        self.layout.each_node(|_, point| {
            let p = point.position();
            positions.extend_from_slice(&[p.x, p.y]);
        });
        positions
    }

    /// One segment per edge as [x1, y1, x2, y2, ...], from the spring's
    /// first endpoint to its second.
    #[wasm_bindgen(js_name = springSegments)]
    pub fn spring_segments(&self) -> Vec<f64> {
        let mut segments = Vec::with_capacity(self.layout.spring_count() * 4);
        self.layout.each_edge(|_, spring| {
            let (Some(from), Some(to)) = (
                self.layout.point(spring.point1()),
                self.layout.point(spring.point2()),
            ) else {
                return;
            };
            let (from, to) = (from.position(), to.position());
            segments.extend_from_slice(&[from.x, from.y, to.x, to.y]);
        });
        segments
    }
}

impl ForceGraphWasm {
    fn from_configs(layout: LayoutConfig, scheduler: SchedulerConfig) -> Self {
        let mut layout = ForceDirectedLayout::new(layout);
        let changed = ChangeFlag::attach(&mut layout);
        Self {
            layout,
            scheduler: StepScheduler::new(scheduler),
            changed,
            on_render: None,
            on_finished: None,
        }
    }

    /// Restart a settled layout if the last call changed the graph.
    fn after_mutation(&mut self) {
        if !self.changed.take() {
            return;
        }
        if let Some(outcome) = self.scheduler.restart(&mut self.layout) {
            self.notify(outcome);
        }
    }

    fn notify(&self, outcome: StepOutcome) {
        if outcome == StepOutcome::Stopped {
            return;
        }
        if let Some(callback) = &self.on_render {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                warn!(?err, "render callback threw");
            }
        }
        if outcome == StepOutcome::Converged {
            if let Some(callback) = &self.on_finished {
                if let Err(err) = callback.call0(&JsValue::NULL) {
                    warn!(?err, "finished callback threw");
                }
            }
        }
    }
}

impl Default for ForceGraphWasm {
    fn default() -> Self {
        Self::new()
    }
}

fn box_to_vec(bounds: &BoundingBox) -> Vec<f64> {
    let (min, max) = (bounds.bottom_left(), bounds.top_right());
    vec![min.x, min.y, max.x, max.y]
}

fn box_from_slice(values: &[f64]) -> Option<BoundingBox> {
    match *values {
        [min_x, min_y, max_x, max_y] if values.iter().all(|v| v.is_finite()) => Some(
            BoundingBox::new(Vector::new(min_x, min_y), Vector::new(max_x, max_y)),
        ),
        _ => None,
    }
}
