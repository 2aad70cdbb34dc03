//! Step scheduler - drives a layout to convergence.
//!
//! A small state machine: `Idle → Running → Finished`, with `stop` forcing
//! `Idle` from any state. The scheduler never sleeps or spawns; whoever owns
//! it (the native [`LayoutDriver`](super::LayoutDriver), or a JS animation
//! loop through the wasm facade) calls [`StepScheduler::step`] once per
//! `interval` while it reports [`StepOutcome::Continue`].
//!
//! A run that converges, including one whose layout was emptied mid-run (an
//! empty point set has zero energy), ends in `Finished` rather than `Idle`.
//! The two are interchangeable for `start` and `restart`; `Finished` only
//! records that the last run settled instead of being stopped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, debug_span, trace};

use super::config::SchedulerConfig;
use super::force_directed::ForceDirectedLayout;
use crate::spatial::BoundingBox;

/// Notification fired by the scheduler on render ticks and on convergence.
pub type StepCallback = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// Converged; behaves like `Idle` for the next `start`.
    Finished,
}

/// What the owner of the scheduler should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Schedule another step after the interval.
    Continue,
    /// Energy fell below the threshold; the run is over.
    Converged,
    /// The scheduler was not running; nothing was stepped.
    Stopped,
}

/// Parameters of one run, kept for restarts after graph changes.
pub struct RunOptions {
    interval: Duration,
    on_render: Option<StepCallback>,
    on_finished: Option<StepCallback>,
    tracked_box: BoundingBox,
}

impl RunOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            on_render: None,
            on_finished: None,
            tracked_box: BoundingBox::default(),
        }
    }

    /// Called after every completed step.
    pub fn on_render<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_render = Some(Box::new(f));
        self
    }

    /// Called once when a run converges.
    pub fn on_finished<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_finished = Some(Box::new(f));
        self
    }

    /// Initial value of the smoothed bounding box.
    pub fn tracking(mut self, tracked_box: BoundingBox) -> Self {
        self.tracked_box = tracked_box;
        self
    }
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("interval", &self.interval)
            .field("on_render", &self.on_render.is_some())
            .field("on_finished", &self.on_finished.is_some())
            .field("tracked_box", &self.tracked_box)
            .finish()
    }
}

#[derive(Debug)]
pub struct StepScheduler {
    config: SchedulerConfig,
    state: SchedulerState,
    options: Option<RunOptions>,
    run_id: u64,
    steps: usize,
}

impl StepScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: SchedulerState::Idle,
            options: None,
            run_id: 0,
            steps: 0,
        }
    }

    /// Begin a run and perform its first step immediately.
    ///
    /// Returns `None` without touching anything if a run is already in
    /// progress; the new options are dropped.
    pub fn start(&mut self, layout: &mut ForceDirectedLayout, options: RunOptions) -> Option<StepOutcome> {
        if self.is_running() {
            return None;
        }
        self.options = Some(options);
        Some(self.begin(layout))
    }

    /// Begin a new run with the options of the previous one.
    ///
    /// Does nothing if a run is in progress or the scheduler has never been
    /// started.
    pub fn restart(&mut self, layout: &mut ForceDirectedLayout) -> Option<StepOutcome> {
        if self.is_running() || self.options.is_none() {
            return None;
        }
        Some(self.begin(layout))
    }

    fn begin(&mut self, layout: &mut ForceDirectedLayout) -> StepOutcome {
        self.state = SchedulerState::Running;
        self.run_id += 1;
        self.steps = 0;
        debug!(run = self.run_id, "layout run started");
        self.step(layout)
    }

    /// Force the scheduler back to `Idle`. A step scheduled for later finds
    /// the scheduler stopped and does nothing.
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Idle {
            debug!(run = self.run_id, steps = self.steps, "layout run stopped");
        }
        self.state = SchedulerState::Idle;
    }

    /// Advance the layout one step if running.
    pub fn step(&mut self, layout: &mut ForceDirectedLayout) -> StepOutcome {
        if self.state != SchedulerState::Running {
            return StepOutcome::Stopped;
        }
        let _span = debug_span!("layout_step", run = self.run_id).entered();

        layout.step(self.config.velocity_time_step, self.config.position_time_step);
        self.steps += 1;

        let Some(options) = self.options.as_mut() else {
            self.state = SchedulerState::Idle;
            return StepOutcome::Stopped;
        };
        if let Some(on_render) = options.on_render.as_mut() {
            on_render();
        }

        let energy = layout.total_energy();
        let bounds = layout.bounding_box();
        trace!(step = self.steps, energy, "layout step");

        if energy < self.config.energy_threshold {
            self.state = SchedulerState::Finished;
            debug!(run = self.run_id, steps = self.steps, energy, "layout converged");
            if let Some(on_finished) = options.on_finished.as_mut() {
                on_finished();
            }
            options.tracked_box.update(&bounds);
            StepOutcome::Converged
        } else {
            options.tracked_box.approach(&bounds, self.config.box_smoothing);
            StepOutcome::Continue
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Pacing of the current (or last) run.
    pub fn interval(&self) -> Option<Duration> {
        self.options.as_ref().map(|o| o.interval)
    }

    /// Smoothed bounding box of the current (or last) run.
    pub fn tracked_box(&self) -> Option<BoundingBox> {
        self.options.as_ref().map(|o| o.tracked_box)
    }

    /// Incremented on every start or restart.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Steps taken in the current (or last) run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Set by a graph listener on every structural change; polled by the owner
/// of a scheduler after each mutation to decide whether to restart.
#[derive(Debug, Clone, Default)]
pub struct ChangeFlag(Arc<AtomicBool>);

impl ChangeFlag {
    pub fn attach(layout: &mut ForceDirectedLayout) -> Self {
        let flag = Self::default();
        let raised = Arc::clone(&flag.0);
        layout.add_listener(move |_| raised.store(true, Ordering::Release));
        flag
    }

    /// Whether anything changed since the last call.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}
