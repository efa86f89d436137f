//! Kinematics and motion quantization for two-link fiber positioners.
//!
//! Each positioner is a theta/phi arm pair reaching targets on a flattened
//! focal surface. This crate covers the device-local concerns:
//!
//! - coordinate transforms between shaft, local, flat-cartesian, and polar
//!   frames ([`transforms`])
//! - per-positioner calibration storage ([`calib`])
//! - quantization of continuous travel into stepper cruise/creep submoves
//!   with backlash removal ([`motion`])
//! - tracked positioner state and direct move construction ([`positioner`])
//!
//! Multi-positioner collision avoidance and pathfinding build on top of
//! this crate and live elsewhere.

pub mod calib;
pub mod core;
pub mod error;
pub mod motion;
pub mod positioner;
pub mod transforms;

pub use calib::{CalibrationParams, CalibrationStore};
pub use core::{Axis, AxisRange, FlatPoint, JointAngles, PolarCoord};
pub use error::{Error, Result};
pub use motion::{MoveSegment, MoveTable, QuantizeOptions, SpeedMode};
pub use positioner::Positioner;
pub use transforms::{
    forward_kinematics, inverse_kinematics, wrap_angle_delta, IkSolution, Transforms,
};
