//! Per-positioner calibration parameters.
//!
//! Calibration is owned and fitted externally; this module only carries the
//! values, validates them on ingest, and derives the handful of motor
//! quantities the quantizer needs.

use crate::core::{Axis, AxisRange};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn default_arm_length() -> f64 {
    3.0
}
fn default_gear_ratio() -> f64 {
    337.47
}
fn default_range_t() -> f64 {
    370.0
}
fn default_range_p() -> f64 {
    190.0
}
fn default_clearance() -> f64 {
    3.0
}
fn default_backlash() -> f64 {
    3.0
}
fn default_final_dir() -> i8 {
    1
}
fn default_creep_period() -> u32 {
    2
}
fn default_spinupdown_period() -> u32 {
    12
}
fn default_creep_step() -> f64 {
    0.1
}
fn default_cruise_step() -> f64 {
    3.3
}
fn default_cruise_rpm() -> f64 {
    9900.0
}
fn default_timer_rate() -> f64 {
    18_000.0
}
fn default_final_creep_dist() -> f64 {
    2.0
}
fn default_motor_dir() -> i8 {
    1
}

/// Calibration parameter set for one positioner.
///
/// All angular quantities are degrees; lengths are mm. Motor-frame values
/// (backlash, step sizes, spin periods) apply at the motor shaft, before
/// the gear reduction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Central arm length in mm.
    #[serde(default = "default_arm_length")]
    pub r1: f64,
    /// Eccentric arm length in mm.
    #[serde(default = "default_arm_length")]
    pub r2: f64,

    /// Angular offset applied going shaft -> local, theta axis.
    #[serde(default)]
    pub offset_t: f64,
    /// Angular offset applied going shaft -> local, phi axis.
    #[serde(default)]
    pub offset_p: f64,
    /// Cartesian offset of the theta axis center in the flattened petal frame.
    #[serde(default)]
    pub offset_x: f64,
    /// Cartesian offset of the theta axis center in the flattened petal frame.
    #[serde(default)]
    pub offset_y: f64,

    /// Gear reduction ratio, theta motor.
    #[serde(default = "default_gear_ratio")]
    pub gear_ratio_t: f64,
    /// Gear reduction ratio, phi motor.
    #[serde(default = "default_gear_ratio")]
    pub gear_ratio_p: f64,
    /// Motor rotation sign for counter-clockwise shaft motion, theta.
    #[serde(default = "default_motor_dir")]
    pub motor_ccw_dir_t: i8,
    /// Motor rotation sign for counter-clockwise shaft motion, phi.
    #[serde(default = "default_motor_dir")]
    pub motor_ccw_dir_p: i8,

    /// Hardstop-to-hardstop travel, theta, degrees.
    #[serde(default = "default_range_t")]
    pub physical_range_t: f64,
    /// Hardstop-to-hardstop travel, phi, degrees.
    #[serde(default = "default_range_p")]
    pub physical_range_p: f64,
    /// Clearance kept from the primary (homing) hardstop, degrees.
    #[serde(default = "default_clearance")]
    pub primary_hardstop_clearance: f64,
    /// Clearance kept from the secondary hardstop, degrees.
    #[serde(default = "default_clearance")]
    pub secondary_hardstop_clearance: f64,

    /// Backlash removal distance at the motor shaft, degrees.
    #[serde(default = "default_backlash")]
    pub backlash: f64,
    /// Preferred final-approach direction, theta (+1 or -1).
    #[serde(default = "default_final_dir")]
    pub final_move_dir_t: i8,
    /// Preferred final-approach direction, phi (+1 or -1).
    #[serde(default = "default_final_dir")]
    pub final_move_dir_p: i8,

    /// Timer intervals per creep step; higher is slower creep.
    #[serde(default = "default_creep_period")]
    pub creep_period: u32,
    /// Timer periods per ramp displacement during spin-up/down.
    #[serde(default = "default_spinupdown_period")]
    pub spinupdown_period: u32,
    /// Motor step size in creep mode, degrees.
    #[serde(default = "default_creep_step")]
    pub creep_step: f64,
    /// Motor step size in cruise mode, degrees.
    #[serde(default = "default_cruise_step")]
    pub cruise_step: f64,
    /// Motor cruise speed in RPM.
    #[serde(default = "default_cruise_rpm")]
    pub cruise_rpm: f64,
    /// Step timer update rate in Hz.
    #[serde(default = "default_timer_rate")]
    pub timer_rate_hz: f64,
    /// Nominal distance reserved for the final creep approach, motor degrees.
    #[serde(default = "default_final_creep_dist")]
    pub final_creep_dist: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            r1: default_arm_length(),
            r2: default_arm_length(),
            offset_t: 0.0,
            offset_p: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            gear_ratio_t: default_gear_ratio(),
            gear_ratio_p: default_gear_ratio(),
            motor_ccw_dir_t: default_motor_dir(),
            motor_ccw_dir_p: default_motor_dir(),
            physical_range_t: default_range_t(),
            physical_range_p: default_range_p(),
            primary_hardstop_clearance: default_clearance(),
            secondary_hardstop_clearance: default_clearance(),
            backlash: default_backlash(),
            final_move_dir_t: default_final_dir(),
            final_move_dir_p: default_final_dir(),
            creep_period: default_creep_period(),
            spinupdown_period: default_spinupdown_period(),
            creep_step: default_creep_step(),
            cruise_step: default_cruise_step(),
            cruise_rpm: default_cruise_rpm(),
            timer_rate_hz: default_timer_rate(),
            final_creep_dist: default_final_creep_dist(),
        }
    }
}

impl CalibrationParams {
    /// Check the parameter set for values outside their physical domain.
    pub fn validate(&self) -> Result<()> {
        if self.r1 <= 0.0 || self.r2 <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "arm lengths must be positive (r1={}, r2={})",
                self.r1, self.r2
            )));
        }
        if self.physical_range_t <= 0.0 || self.physical_range_p <= 0.0 {
            return Err(Error::InvalidParameter(
                "physical ranges must be positive".into(),
            ));
        }
        if self.creep_step <= 0.0 || self.cruise_step < self.creep_step {
            return Err(Error::InvalidParameter(format!(
                "bad step sizes (creep={}, cruise={})",
                self.creep_step, self.cruise_step
            )));
        }
        if self.final_move_dir_t.abs() != 1 || self.final_move_dir_p.abs() != 1 {
            return Err(Error::InvalidParameter(
                "final move directions must be +1 or -1".into(),
            ));
        }
        Ok(())
    }

    /// Gear ratio for one axis.
    #[inline]
    pub fn gear_ratio(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Theta => self.gear_ratio_t,
            Axis::Phi => self.gear_ratio_p,
        }
    }

    /// Motor-to-shaft direction sign for one axis.
    #[inline]
    pub fn ccw_sign(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Theta => self.motor_ccw_dir_t as f64,
            Axis::Phi => self.motor_ccw_dir_p as f64,
        }
    }

    /// Preferred final-approach direction at the motor for one axis.
    #[inline]
    pub fn final_move_dir(&self, axis: Axis) -> f64 {
        let shaft_dir = match axis {
            Axis::Theta => self.final_move_dir_t as f64,
            Axis::Phi => self.final_move_dir_p as f64,
        };
        shaft_dir * self.ccw_sign(axis)
    }

    /// Hardstop-to-hardstop range for one axis, in shaft degrees.
    ///
    /// Theta is split so that zero sits mid-range; phi so that zero sits
    /// essentially at the retracted stop.
    pub fn full_range(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::Theta => {
                let r = self.physical_range_t.abs();
                AxisRange::new(-0.5 * r, 0.5 * r)
            }
            Axis::Phi => {
                let r = self.physical_range_p.abs();
                AxisRange::new(-0.01 * r, 0.99 * r)
            }
        }
    }

    /// Motor creep speed in deg/s.
    #[inline]
    pub fn creep_speed(&self) -> f64 {
        self.timer_rate_hz * self.creep_step / self.creep_period as f64
    }

    /// Motor cruise speed in deg/s.
    #[inline]
    pub fn cruise_speed(&self) -> f64 {
        self.cruise_rpm * 360.0 / 60.0
    }

    /// Distance covered during one spin-up (or spin-down) ramp, motor degrees.
    ///
    /// The firmware ramps through every creep-sized displacement between
    /// creep and cruise step size, each repeated `spinupdown_period` times.
    pub fn spinupdown_distance(&self) -> f64 {
        let ramp_steps = (self.cruise_step / self.creep_step).round() as u32 + 1;
        let ramp: u32 = (0..ramp_steps).sum();
        ramp as f64 * self.creep_step * self.spinupdown_period as f64
    }
}

/// A read-only collection of calibration sets keyed by positioner id.
#[derive(Clone, Debug, Default)]
pub struct CalibrationStore {
    params: HashMap<u32, CalibrationParams>,
}

#[derive(Deserialize)]
struct StoreFile {
    #[serde(default)]
    positioner: HashMap<String, CalibrationParams>,
}

impl CalibrationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a TOML file with one `[positioner.<id>]` table per
    /// positioner.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a store from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: StoreFile = toml::from_str(text)?;
        let mut params = HashMap::new();
        for (key, p) in file.positioner {
            let id: u32 = key.parse().map_err(|_| {
                Error::InvalidParameter(format!("bad positioner id {key:?}"))
            })?;
            p.validate()?;
            params.insert(id, p);
        }
        Ok(Self { params })
    }

    /// Insert or replace one positioner's parameters.
    pub fn insert(&mut self, id: u32, p: CalibrationParams) -> Result<()> {
        p.validate()?;
        self.params.insert(id, p);
        Ok(())
    }

    /// Look up a positioner's parameters.
    pub fn get(&self, id: u32) -> Result<&CalibrationParams> {
        self.params.get(&id).ok_or(Error::MissingCalibration(id))
    }

    /// Number of positioners in the store.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
