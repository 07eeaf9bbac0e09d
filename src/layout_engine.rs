//! Where a bubble may be, and how it gets there.

pub mod bounds;
pub mod easing;

pub use bounds::Edge;
pub use easing::{Curve, Overshoot};
