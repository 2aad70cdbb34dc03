//! Physics primitives for the layout simulation.
//!
//! - `vector`: 2D value algebra plus in-place accumulators
//! - `point`: a massive particle per graph node
//! - `spring`: a Hooke connector per graph edge

mod point;
mod spring;
mod vector;

pub use point::Point;
pub use spring::Spring;
pub use vector::Vector;
