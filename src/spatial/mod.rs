//! Spatial queries over the simulated points.
//!
//! - `bounds`: the padded bounding box used to frame a layout
//! - `nearest`: linear-scan hit testing

mod bounds;
mod nearest;

pub use bounds::BoundingBox;
pub use nearest::Nearest;
