//! Executable move tables.
//!
//! A [`MoveTable`] is the stable boundary handed to the external hardware
//! layer: per-axis ordered submoves with signed step counts, speed mode,
//! distance, and duration. Byte-level encoding for the bus is out of scope
//! here; downstream consumes exactly this shape.

use crate::core::{Axis, JointAngles};
use serde::{Deserialize, Serialize};

/// Stepper speed mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedMode {
    /// Fast stepping with acceleration ramps.
    Cruise,
    /// Slow fine stepping.
    Creep,
}

/// One quantized submove on a single axis.
///
/// `steps` is the signed motor step count; `distance` is the net travel in
/// joint-space degrees (already scaled back through the gear ratio);
/// `duration` is the execution time in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MoveSegment {
    /// Fast segment with spin-up/down ramps.
    Cruise {
        /// Signed motor step count.
        steps: i64,
        /// Net travel in degrees.
        distance: f64,
        /// Execution time in seconds.
        duration: f64,
    },
    /// Slow fine-stepping segment.
    Creep {
        /// Signed motor step count.
        steps: i64,
        /// Net travel in degrees.
        distance: f64,
        /// Execution time in seconds.
        duration: f64,
    },
}

impl MoveSegment {
    /// Signed step count.
    #[inline]
    pub fn steps(&self) -> i64 {
        match *self {
            MoveSegment::Cruise { steps, .. } | MoveSegment::Creep { steps, .. } => steps,
        }
    }

    /// Net travel in degrees.
    #[inline]
    pub fn distance(&self) -> f64 {
        match *self {
            MoveSegment::Cruise { distance, .. } | MoveSegment::Creep { distance, .. } => distance,
        }
    }

    /// Execution time in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        match *self {
            MoveSegment::Cruise { duration, .. } | MoveSegment::Creep { duration, .. } => duration,
        }
    }

    /// Speed mode tag.
    #[inline]
    pub fn mode(&self) -> SpeedMode {
        match self {
            MoveSegment::Cruise { .. } => SpeedMode::Cruise,
            MoveSegment::Creep { .. } => SpeedMode::Creep,
        }
    }

    /// Scale distance by a factor (joint/motor frame conversion).
    pub(crate) fn scaled(self, factor: f64) -> Self {
        match self {
            MoveSegment::Cruise { steps, distance, duration } => MoveSegment::Cruise {
                steps,
                distance: distance * factor,
                duration,
            },
            MoveSegment::Creep { steps, distance, duration } => MoveSegment::Creep {
                steps,
                distance: distance * factor,
                duration,
            },
        }
    }
}

/// One positioner's executable move sequence, both axes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTable {
    /// Shaft position the table starts from.
    pub start: JointAngles,
    /// Ordered theta-axis submoves.
    pub theta: Vec<MoveSegment>,
    /// Ordered phi-axis submoves.
    pub phi: Vec<MoveSegment>,
}

impl MoveTable {
    /// Create an empty table starting at `start`.
    pub fn new(start: JointAngles) -> Self {
        Self {
            start,
            theta: Vec::new(),
            phi: Vec::new(),
        }
    }

    /// Submove list for one axis.
    #[inline]
    pub fn rows(&self, axis: Axis) -> &[MoveSegment] {
        match axis {
            Axis::Theta => &self.theta,
            Axis::Phi => &self.phi,
        }
    }

    /// Append submoves to one axis.
    pub fn extend_axis(&mut self, axis: Axis, segments: impl IntoIterator<Item = MoveSegment>) {
        match axis {
            Axis::Theta => self.theta.extend(segments),
            Axis::Phi => self.phi.extend(segments),
        }
    }

    /// Net signed displacement of one axis, in degrees.
    pub fn net_delta(&self, axis: Axis) -> f64 {
        self.rows(axis).iter().map(|s| s.distance()).sum()
    }

    /// Net displacement of both axes.
    pub fn net_deltas(&self) -> JointAngles {
        JointAngles::new(self.net_delta(Axis::Theta), self.net_delta(Axis::Phi))
    }

    /// Shaft position expected after execution.
    pub fn expected_finish(&self) -> JointAngles {
        self.start + self.net_deltas()
    }

    /// Wall-clock execution time with both axes stepping concurrently.
    pub fn total_time(&self) -> f64 {
        let t: f64 = self.theta.iter().map(|s| s.duration()).sum();
        let p: f64 = self.phi.iter().map(|s| s.duration()).sum();
        t.max(p)
    }

    /// Whether the table contains no submoves at all.
    pub fn is_empty(&self) -> bool {
        self.theta.is_empty() && self.phi.is_empty()
    }
}
