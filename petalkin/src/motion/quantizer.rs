//! Quantization of continuous travel into stepper submoves.
//!
//! Converts one already-limit-truncated signed distance (motor-frame
//! degrees) into an ordered cruise/creep submove list. Step counts round
//! half away from zero; every emitted segment's distance is an exact
//! integer multiple of its step size, so the net table displacement lands
//! within one creep step of the request.
//!
//! This component has no side effects: the tracked shaft position changes
//! only when the external layer confirms execution (see
//! [`crate::positioner::Positioner::confirm_move`]).

use crate::calib::CalibrationParams;
use crate::core::Axis;
use crate::motion::table::MoveSegment;

/// Options controlling how a single travel request is quantized.
#[derive(Clone, Copy, Debug)]
pub struct QuantizeOptions {
    /// Permit cruise-mode stepping for long moves.
    pub allow_cruise: bool,
    /// Append the backlash-removal pair when the move settles against the
    /// preferred final-approach direction.
    pub backlash_removal: bool,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            allow_cruise: true,
            backlash_removal: true,
        }
    }
}

impl QuantizeOptions {
    /// Creep-only, no backlash handling.
    pub fn creep_only() -> Self {
        Self {
            allow_cruise: false,
            backlash_removal: false,
        }
    }
}

/// Per-axis quantizer bound to one positioner's calibration.
#[derive(Clone, Copy, Debug)]
pub struct MotionQuantizer<'a> {
    calib: &'a CalibrationParams,
}

impl<'a> MotionQuantizer<'a> {
    /// Bind to a calibration set.
    pub fn new(calib: &'a CalibrationParams) -> Self {
        Self { calib }
    }

    /// Quantize one signed motor-frame distance into cruise/creep segments.
    ///
    /// Zero distance (or a distance rounding to zero steps) yields an empty
    /// list. Travel limits are not re-checked here; that happens upstream.
    pub fn quantize(&self, distance: f64, allow_cruise: bool) -> Vec<MoveSegment> {
        if distance == 0.0 {
            return Vec::new();
        }
        let c = self.calib;
        let sign = distance.signum();

        // Ramp distance quantized to whole cruise steps, both ramps.
        let spin_steps = (c.spinupdown_distance() / c.cruise_step).round() as i64;
        let spin_dist = 2.0 * spin_steps as f64 * c.cruise_step;

        if !allow_cruise || distance.abs() <= spin_dist + c.final_creep_dist {
            return self.creep_segment(distance).into_iter().collect();
        }

        let mut segments = Vec::with_capacity(2);

        // Cruise covers the body of the move plus both ramps; the reserve
        // left for the final creep keeps the settle slow.
        let body = distance - sign * (spin_dist + c.final_creep_dist);
        let body_steps = (body / c.cruise_step).round() as i64;
        let cruise_steps = body_steps + sign as i64 * 2 * spin_steps;
        if cruise_steps != 0 {
            let cruise_dist = cruise_steps as f64 * c.cruise_step;
            let duration = cruise_steps.unsigned_abs() as f64 * c.cruise_step / c.cruise_speed()
                + 4.0 * c.spinupdown_distance() / c.cruise_speed();
            segments.push(MoveSegment::Cruise {
                steps: cruise_steps,
                distance: cruise_dist,
                duration,
            });
        }

        let covered: f64 = segments.iter().map(|s| s.distance()).sum();
        segments.extend(self.creep_segment(distance - covered));
        segments
    }

    /// Quantize with backlash removal for one axis.
    ///
    /// A move whose net direction already matches the axis's preferred
    /// final-approach direction emits no extra segments. A move settling
    /// against it emits the primary segments followed by exactly one
    /// overshoot (past the target, creep) and one undershoot back onto the
    /// target, creeping in the preferred direction so the gear-train slack
    /// is taken up on every settle.
    pub fn quantize_axis_move(
        &self,
        axis: Axis,
        distance: f64,
        options: QuantizeOptions,
    ) -> Vec<MoveSegment> {
        if distance == 0.0 {
            return Vec::new();
        }
        let mut segments = self.quantize(distance, options.allow_cruise);
        let backlash = self.calib.backlash;
        if !options.backlash_removal || backlash == 0.0 {
            return segments;
        }
        let sign = distance.signum();
        if sign == self.calib.final_move_dir(axis) {
            return segments;
        }
        segments.extend(self.quantize(sign * backlash, false));
        segments.extend(self.quantize(-sign * backlash, false));
        segments
    }

    fn creep_segment(&self, distance: f64) -> Option<MoveSegment> {
        let c = self.calib;
        let steps = (distance / c.creep_step).round() as i64;
        if steps == 0 {
            return None;
        }
        Some(MoveSegment::Creep {
            steps,
            distance: steps as f64 * c.creep_step,
            duration: steps.unsigned_abs() as f64 * c.creep_step / c.creep_speed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::table::SpeedMode;

    fn bench_params() -> CalibrationParams {
        // No accel ramp so short test moves still cruise.
        CalibrationParams {
            spinupdown_period: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_distance_is_empty() {
        let calib = bench_params();
        let q = MotionQuantizer::new(&calib);
        assert!(q.quantize(0.0, true).is_empty());
        assert!(q
            .quantize_axis_move(Axis::Phi, 0.0, QuantizeOptions::default())
            .is_empty());
    }

    #[test]
    fn test_short_move_creeps() {
        let calib = bench_params();
        let q = MotionQuantizer::new(&calib);
        let segs = q.quantize(1.5, true);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].mode(), SpeedMode::Creep);
        assert_eq!(segs[0].steps(), 15);
        assert!((segs[0].distance() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_cruise_plus_creep_residual() {
        // 50° with cruise step 3.3 and creep step 0.1: one cruise segment
        // plus one creep residual, conserved within half a creep step.
        let calib = bench_params();
        let q = MotionQuantizer::new(&calib);
        let segs = q.quantize(50.0, true);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].mode(), SpeedMode::Cruise);
        assert_eq!(segs[1].mode(), SpeedMode::Creep);
        let total: f64 = segs.iter().map(|s| s.distance()).sum();
        assert!((total - 50.0).abs() <= 0.05, "total {total}");
    }

    #[test]
    fn test_conservation_and_step_multiples() {
        let calib = bench_params();
        let q = MotionQuantizer::new(&calib);
        let mut d = -200.0;
        while d <= 200.0 {
            for allow_cruise in [false, true] {
                let segs = q.quantize(d, allow_cruise);
                let total: f64 = segs.iter().map(|s| s.distance()).sum();
                assert!(
                    (total - d).abs() <= calib.creep_step,
                    "d={d} total={total}"
                );
                for s in &segs {
                    let step = match s.mode() {
                        SpeedMode::Cruise => calib.cruise_step,
                        SpeedMode::Creep => calib.creep_step,
                    };
                    assert!((s.distance() - s.steps() as f64 * step).abs() < 1e-9);
                }
            }
            d += 7.03;
        }
    }

    #[test]
    fn test_creep_only_flag() {
        let calib = bench_params();
        let q = MotionQuantizer::new(&calib);
        let segs = q.quantize(50.0, false);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].mode(), SpeedMode::Creep);
        assert_eq!(segs[0].steps(), 500);
    }

    #[test]
    fn test_backlash_pair_on_opposing_move() {
        // Preferred direction is +1; a negative move settles against it and
        // gets exactly one overshoot+undershoot pair after the primary.
        let calib = bench_params();
        let q = MotionQuantizer::new(&calib);
        let segs = q.quantize_axis_move(Axis::Phi, -20.0, QuantizeOptions::default());
        let n = segs.len();
        assert!(n >= 3);
        let overshoot = &segs[n - 2];
        let undershoot = &segs[n - 1];
        assert_eq!(overshoot.mode(), SpeedMode::Creep);
        assert_eq!(undershoot.mode(), SpeedMode::Creep);
        assert!((overshoot.distance() + calib.backlash).abs() < 1e-9);
        assert!((undershoot.distance() - calib.backlash).abs() < 1e-9);
        // Undershoot finishes in the preferred direction.
        assert!(undershoot.distance().signum() == calib.final_move_dir(Axis::Phi));
        // Net displacement unchanged by the pair.
        let total: f64 = segs.iter().map(|s| s.distance()).sum();
        assert!((total - -20.0).abs() <= calib.creep_step);
    }

    #[test]
    fn test_no_backlash_pair_on_aligned_move() {
        let calib = bench_params();
        let q = MotionQuantizer::new(&calib);
        let segs = q.quantize_axis_move(Axis::Phi, 20.0, QuantizeOptions::default());
        let plain = q.quantize(20.0, true);
        assert_eq!(segs, plain);
    }

    #[test]
    fn test_ramp_distance_counts_in_cruise() {
        let calib = CalibrationParams {
            spinupdown_period: 1,
            ..Default::default()
        };
        let q = MotionQuantizer::new(&calib);
        // Two ramps of 17 cruise steps each (56.1° quantized to 3.3° steps).
        let segs = q.quantize(300.0, true);
        assert_eq!(segs[0].mode(), SpeedMode::Cruise);
        let total: f64 = segs.iter().map(|s| s.distance()).sum();
        assert!((total - 300.0).abs() <= calib.creep_step);
    }
}
