//! Native timer loop around a layout and its scheduler.
//!
//! The layout and scheduler sit behind one coarse mutex: a step and a
//! structural mutation each hold it for their whole duration, so neither
//! ever observes the other half-done. The stepping task sleeps without the
//! lock and re-checks the run id after waking, so a stop or restart in the
//! meantime retires it.
//!
//! Callbacks (change listeners, render and finished notifications) run with
//! the lock held and must not call back into the driver.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::trace;

use super::config::SchedulerConfig;
use super::force_directed::ForceDirectedLayout;
use super::scheduler::{ChangeFlag, RunOptions, SchedulerState, StepOutcome, StepScheduler};
use crate::error::Result;
use crate::graph::{EdgeData, EdgeId, NodeData, NodeId};
use crate::spatial::BoundingBox;

struct Shared {
    layout: ForceDirectedLayout,
    scheduler: StepScheduler,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs a [`ForceDirectedLayout`] to convergence on a tokio runtime and
/// restarts it after every structural change.
pub struct LayoutDriver {
    shared: Arc<Mutex<Shared>>,
    changed: ChangeFlag,
    runtime: Handle,
}

impl LayoutDriver {
    pub fn new(mut layout: ForceDirectedLayout, config: SchedulerConfig, runtime: Handle) -> Self {
        let changed = ChangeFlag::attach(&mut layout);
        Self {
            shared: Arc::new(Mutex::new(Shared {
                layout,
                scheduler: StepScheduler::new(config),
            })),
            changed,
            runtime,
        }
    }

    /// Start a run. The first step happens before this returns.
    ///
    /// Returns false if a run was already in progress.
    pub fn start(&self, options: RunOptions) -> bool {
        let mut guard = lock(&self.shared);
        let shared = &mut *guard;
        self.changed.take();

        match shared.scheduler.start(&mut shared.layout, options) {
            Some(outcome) => {
                self.follow_up(&shared.scheduler, outcome);
                true
            }
            None => false,
        }
    }

    pub fn stop(&self) {
        lock(&self.shared).scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).scheduler.is_running()
    }

    pub fn state(&self) -> SchedulerState {
        lock(&self.shared).scheduler.state()
    }

    pub fn tracked_box(&self) -> Option<BoundingBox> {
        lock(&self.shared).scheduler.tracked_box()
    }

    /// Mutate the layout under the lock. If the graph structure changed and
    /// no run is in progress, a new run starts with the previous options.
    pub fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ForceDirectedLayout) -> R,
    {
        let mut guard = lock(&self.shared);
        let shared = &mut *guard;
        let result = f(&mut shared.layout);

        if self.changed.take() {
            if let Some(outcome) = shared.scheduler.restart(&mut shared.layout) {
                self.follow_up(&shared.scheduler, outcome);
            }
        }
        result
    }

    /// Read the layout under the lock.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ForceDirectedLayout) -> R,
    {
        f(&lock(&self.shared).layout)
    }

    pub fn add_node(&self, data: NodeData) -> Result<NodeId> {
        self.mutate(|layout| layout.add_node(data))
    }

    pub fn add_edge(&self, source: NodeId, target: NodeId, data: EdgeData) -> Result<EdgeId> {
        self.mutate(|layout| layout.add_edge(source, target, data))
    }

    pub fn remove_node(&self, id: NodeId) -> bool {
        self.mutate(|layout| layout.remove_node(id))
    }

    pub fn remove_edge(&self, id: EdgeId) -> bool {
        self.mutate(|layout| layout.remove_edge(id))
    }

    fn follow_up(&self, scheduler: &StepScheduler, outcome: StepOutcome) {
        if outcome != StepOutcome::Continue {
            return;
        }
        if let Some(interval) = scheduler.interval() {
            self.spawn_loop(scheduler.run_id(), interval);
        }
    }

    fn spawn_loop(&self, run_id: u64, interval: Duration) {
        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let mut guard = lock(&shared);
                let Shared { layout, scheduler } = &mut *guard;
                if scheduler.run_id() != run_id {
                    trace!(run = run_id, "stale layout task exiting");
                    break;
                }
                if scheduler.step(layout) != StepOutcome::Continue {
                    break;
                }
            }
        });
    }
}
