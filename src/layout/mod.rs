//! Force-directed layout.
//!
//! `ForceDirectedLayout` owns a graph together with the points and springs
//! simulated for it. `StepScheduler` drives it to convergence one step at a
//! time, and on native targets `LayoutDriver` paces those steps on a tokio
//! runtime.

mod config;
#[cfg(not(target_arch = "wasm32"))]
mod driver;
mod force_directed;
mod scheduler;

pub use config::{LayoutConfig, SchedulerConfig};
#[cfg(not(target_arch = "wasm32"))]
pub use driver::LayoutDriver;
pub use force_directed::{ForceDirectedLayout, REPULSION_EPSILON};
pub use scheduler::{
    ChangeFlag, RunOptions, SchedulerState, StepCallback, StepOutcome, StepScheduler,
};
