//! Single-positioner state and move construction.
//!
//! A [`Positioner`] tracks one device's believed shaft position, enforces
//! its targetable travel range, and turns requested joint deltas into
//! executable [`MoveTable`]s. The tracked position never changes as a side
//! effect of planning; callers apply [`Positioner::confirm_move`] once the
//! hardware reports the table executed.

use crate::calib::CalibrationParams;
use crate::core::{Axis, AxisRange, JointAngles};
use crate::error::{Error, Result};
use crate::motion::{MotionQuantizer, MoveSegment, MoveTable, QuantizeOptions};

/// One fiber positioner: calibration plus tracked shaft state.
#[derive(Clone, Debug)]
pub struct Positioner {
    id: u32,
    calib: CalibrationParams,
    pos: JointAngles,
    /// Direction of the last homing contact per axis (-1 = low hardstop).
    homing_dir: [i8; 2],
    /// When set, range truncation is bypassed (hardstop-seeking moves).
    pub allow_exceed_limits: bool,
}

impl Positioner {
    /// Create a positioner at the given shaft position, assumed homed at
    /// the low hardstop on both axes.
    pub fn new(id: u32, calib: CalibrationParams, pos: JointAngles) -> Result<Self> {
        calib.validate()?;
        Ok(Self {
            id,
            calib,
            pos,
            homing_dir: [-1, -1],
            allow_exceed_limits: false,
        })
    }

    /// Positioner id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Calibration parameter set.
    #[inline]
    pub fn calib(&self) -> &CalibrationParams {
        &self.calib
    }

    /// Currently believed shaft position.
    #[inline]
    pub fn position(&self) -> JointAngles {
        self.pos
    }

    /// Overwrite the tracked shaft position (homing, recovery).
    pub fn set_position(&mut self, pos: JointAngles) -> Result<()> {
        if !self.allow_exceed_limits {
            for axis in Axis::ALL {
                if !self.calib.full_range(axis).contains(pos[axis]) {
                    return Err(Error::InvalidParameter(format!(
                        "position {} outside physical range on {axis}",
                        pos[axis]
                    )));
                }
            }
        }
        self.pos = pos;
        Ok(())
    }

    /// Record a completed homing sequence on one axis.
    ///
    /// `direction` is the hardstop that was contacted (-1 low, +1 high);
    /// the tracked position snaps to that hardstop.
    pub fn set_homed(&mut self, axis: Axis, direction: i8) -> Result<()> {
        if direction.abs() != 1 {
            return Err(Error::InvalidParameter(format!(
                "homing direction must be +1 or -1, got {direction}"
            )));
        }
        self.homing_dir[axis as usize] = direction;
        let full = self.calib.full_range(axis);
        self.pos[axis] = if direction < 0 { full.min } else { full.max };
        Ok(())
    }

    /// Targetable range for one axis, in shaft degrees.
    ///
    /// The physical range is shrunk by the hardstop clearances (primary at
    /// the last-homed side), plus the shaft-frame backlash on whichever
    /// side an against-preferred-direction settle overshoots toward.
    pub fn axis_range(&self, axis: Axis) -> AxisRange {
        let shaft_backlash = self.calib.backlash / self.calib.gear_ratio(axis);
        let (mut low, mut high) = if self.homing_dir[axis as usize] < 0 {
            (
                self.calib.primary_hardstop_clearance,
                self.calib.secondary_hardstop_clearance,
            )
        } else {
            (
                self.calib.secondary_hardstop_clearance,
                self.calib.primary_hardstop_clearance,
            )
        };
        let shaft_dir = match axis {
            Axis::Theta => self.calib.final_move_dir_t,
            Axis::Phi => self.calib.final_move_dir_p,
        };
        if shaft_dir > 0 {
            low += shaft_backlash;
        } else {
            high += shaft_backlash;
        }
        self.calib.full_range(axis).shrunk(low, high)
    }

    /// Clamp a target into the axis's targetable range.
    ///
    /// Returns the admissible target and whether truncation occurred. When
    /// `allow_exceed_limits` is set the target passes through untouched.
    pub fn truncate_to_limits(&self, axis: Axis, target: f64) -> (f64, bool) {
        if self.allow_exceed_limits {
            return (target, false);
        }
        let range = self.axis_range(axis);
        let clamped = range.clamp(target);
        (clamped, clamped != target)
    }

    /// Quantize one joint-frame delta into joint-frame submoves.
    ///
    /// The delta is scaled through the gear ratio and motor direction sign
    /// into the motor frame, quantized there, and the resulting distances
    /// scaled back so each segment's `distance` reads in shaft degrees.
    pub fn quantize_joint_move(
        &self,
        axis: Axis,
        joint_delta: f64,
        options: QuantizeOptions,
    ) -> Vec<MoveSegment> {
        let gear = self.calib.gear_ratio(axis);
        let sign = self.calib.ccw_sign(axis);
        let motor_delta = joint_delta * gear * sign;
        let quantizer = MotionQuantizer::new(&self.calib);
        quantizer
            .quantize_axis_move(axis, motor_delta, options)
            .into_iter()
            .map(|s| s.scaled(sign / gear))
            .collect()
    }

    /// Build a direct (non-pathfound) move table to a joint target.
    ///
    /// Each axis target is truncated to its travel range, then quantized
    /// independently. Logs at debug when truncation kicks in.
    pub fn direct_move_table(
        &self,
        target: JointAngles,
        options: QuantizeOptions,
    ) -> MoveTable {
        let mut table = MoveTable::new(self.pos);
        for axis in Axis::ALL {
            let (admissible, truncated) = self.truncate_to_limits(axis, target[axis]);
            if truncated {
                log::debug!(
                    "positioner {}: {axis} target {} truncated to {admissible}",
                    self.id,
                    target[axis]
                );
            }
            let delta = admissible - self.pos[axis];
            table.extend_axis(axis, self.quantize_joint_move(axis, delta, options));
        }
        table
    }

    /// Commit a table's net displacement to the tracked position.
    ///
    /// This is the only place the believed position advances.
    pub fn confirm_move(&mut self, table: &MoveTable) {
        self.pos = self.pos + table.net_deltas();
    }
}
