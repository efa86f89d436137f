//! Fundamental value types: axes, angle pairs, points, travel ranges.

pub mod angles;
pub mod point;
pub mod range;

pub use angles::{Axis, JointAngles};
pub use point::{FlatPoint, PolarCoord};
pub use range::AxisRange;
