//! Tunable constants for the simulation and its scheduler.
//!
//! Both structs deserialize from partial documents; missing fields take the
//! defaults listed on each field.

use serde::{Deserialize, Serialize};

/// Physical constants of a [`ForceDirectedLayout`](super::ForceDirectedLayout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Spring stiffness applied to every force-carrying spring (default: 500.0).
    pub stiffness: f64,
    /// Repulsion constant between every pair of points (default: 500.0).
    /// Also scales the pull toward the origin.
    pub repulsion: f64,
    /// Velocity scale applied once per step, below 1 (default: 0.5).
    pub damping: f64,
    /// Seed for initial placement. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stiffness: 500.0,
            repulsion: 500.0,
            damping: 0.5,
            seed: None,
        }
    }
}

/// Pacing and convergence settings of a [`StepScheduler`](super::StepScheduler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Simulated time per step for the velocity update (default: 0.03).
    pub velocity_time_step: f64,
    /// Simulated time per step for the position update (default: 0.03).
    pub position_time_step: f64,
    /// Total kinetic energy below which the layout is settled (default: 0.01).
    pub energy_threshold: f64,
    /// Fraction of the way the tracked box moves toward the computed box
    /// each step (default: 0.1).
    pub box_smoothing: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            velocity_time_step: 0.03,
            position_time_step: 0.03,
            energy_threshold: 0.01,
            box_smoothing: 0.1,
        }
    }
}
