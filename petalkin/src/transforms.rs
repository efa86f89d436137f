//! Coordinate transforms between positioner frames.
//!
//! All conversions between frames go through this module so that they stay
//! consistent and invertible. The frames are:
//!
//! - shaft TP ... internally tracked gearbox-output angles
//! - local TP ... angles as seen by an observer (calibration offsets applied)
//! - local XY ... Cartesian mm, centered on the theta axis
//! - flat XY  ... Cartesian mm in the flattened petal frame
//! - polar QS ... angle/radius about the optical axis, over flat XY
//!
//! Unreachable targets are reported through [`IkSolution::reachable`],
//! never as an error; callers must check the flag.

use crate::calib::CalibrationParams;
use crate::core::{AxisRange, FlatPoint, JointAngles, PolarCoord};

/// Result of an inverse-kinematics solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IkSolution {
    /// Best achievable joint angles for the requested point.
    pub angles: JointAngles,
    /// False when the target radius fell outside the reachable annulus and
    /// the returned angles are the closest approach along the target bearing.
    pub reachable: bool,
}

/// Forward 2-link kinematics in the local frame.
///
/// `r1` is the central arm, `r2` the eccentric arm.
#[inline]
pub fn forward_kinematics(tp: JointAngles, r1: f64, r2: f64) -> FlatPoint {
    let t = tp.theta.to_radians();
    let tp_sum = (tp.theta + tp.phi).to_radians();
    FlatPoint::new(
        r1 * t.cos() + r2 * tp_sum.cos(),
        r1 * t.sin() + r2 * tp_sum.sin(),
    )
}

/// Inverse 2-link kinematics in the local frame.
///
/// Solves phi by the law of cosines (acos argument clamped to [-1, 1] to
/// absorb floating-point noise) and theta via atan2 minus the phi-derived
/// term. A target radius outside the annulus [|r1-r2|, r1+r2] is clamped to
/// the nearest bound and flagged unreachable; the returned angles are then
/// the closest approach along the target bearing.
///
/// Both angles are wrapped by ±360° into their travel ranges where possible,
/// preferring the theta candidate nearest the range center so the arm avoids
/// unnecessarily large rotations. This wrap selection is a documented
/// best-effort, not a nearest-valid-angle guarantee. Angles that cannot be
/// wrapped into range are clamped to the nearest bound.
pub fn inverse_kinematics(
    target: FlatPoint,
    r1: f64,
    r2: f64,
    ranges: [AxisRange; 2],
) -> IkSolution {
    let r_min = (r1 - r2).abs();
    let r_max = r1 + r2;
    let radius = target.hypot();

    let mut reachable = true;
    let effective = if radius < r_min {
        reachable = false;
        r_min
    } else if radius > r_max {
        reachable = false;
        r_max
    } else {
        radius
    };

    let cos_phi = ((effective * effective - r1 * r1 - r2 * r2) / (2.0 * r1 * r2)).clamp(-1.0, 1.0);
    let phi_rad = cos_phi.acos();

    // Bearing of the target; degenerate at the exact origin, where any
    // bearing gives the same folded-arm solution.
    let bearing = if radius > f64::EPSILON {
        target.y.atan2(target.x)
    } else {
        0.0
    };
    let theta_rad = bearing - (r2 * phi_rad.sin()).atan2(r1 + r2 * phi_rad.cos());

    let theta = wrap_into_range(theta_rad.to_degrees(), ranges[0]);
    let phi = wrap_into_range(phi_rad.to_degrees(), ranges[1]);

    IkSolution {
        angles: JointAngles::new(theta, phi),
        reachable,
    }
}

/// Wrap `angle` by whole turns into `range`, picking the in-range candidate
/// nearest the range center; clamp if no candidate lands inside.
fn wrap_into_range(angle: f64, range: AxisRange) -> f64 {
    let mut best: Option<f64> = None;
    for k in -2..=2 {
        let candidate = angle + 360.0 * k as f64;
        if !range.contains(candidate) {
            continue;
        }
        let dist = (candidate - range.center()).abs();
        match best {
            Some(b) if (b - range.center()).abs() <= dist => {}
            _ => best = Some(candidate),
        }
    }
    best.unwrap_or_else(|| range.clamp(angle))
}

/// Wrap a joint-angle delta across a travel-limit discontinuity.
///
/// A ±360° wrap is applied only when the wrapped delta both keeps
/// `start + delta` inside the physical range and is strictly smaller in
/// magnitude than the unwrapped delta; otherwise the unwrapped delta is
/// kept unchanged.
pub fn wrap_angle_delta(start: f64, delta: f64, range: AxisRange) -> f64 {
    let mut best = delta;
    for candidate in [delta - 360.0, delta + 360.0] {
        if candidate.abs() < best.abs() && range.contains(start + candidate) {
            best = candidate;
        }
    }
    best
}

/// Frame conversions bound to one positioner's calibration.
#[derive(Clone, Copy, Debug)]
pub struct Transforms<'a> {
    calib: &'a CalibrationParams,
}

impl<'a> Transforms<'a> {
    /// Bind to a calibration set.
    pub fn new(calib: &'a CalibrationParams) -> Self {
        Self { calib }
    }

    /// Shaft angles to observer (local) angles.
    #[inline]
    pub fn shaft_to_local(&self, tp: JointAngles) -> JointAngles {
        JointAngles::new(tp.theta + self.calib.offset_t, tp.phi + self.calib.offset_p)
    }

    /// Observer (local) angles to shaft angles.
    #[inline]
    pub fn local_to_shaft(&self, tp: JointAngles) -> JointAngles {
        JointAngles::new(tp.theta - self.calib.offset_t, tp.phi - self.calib.offset_p)
    }

    /// Local angles to local Cartesian.
    #[inline]
    pub fn local_tp_to_xy(&self, tp: JointAngles) -> FlatPoint {
        forward_kinematics(tp, self.calib.r1, self.calib.r2)
    }

    /// Local Cartesian to flattened petal Cartesian.
    #[inline]
    pub fn local_xy_to_flat(&self, p: FlatPoint) -> FlatPoint {
        FlatPoint::new(p.x + self.calib.offset_x, p.y + self.calib.offset_y)
    }

    /// Flattened petal Cartesian to local Cartesian.
    #[inline]
    pub fn flat_to_local_xy(&self, p: FlatPoint) -> FlatPoint {
        FlatPoint::new(p.x - self.calib.offset_x, p.y - self.calib.offset_y)
    }

    /// Shaft angles straight through to the flattened petal frame.
    pub fn shaft_to_flat_xy(&self, tp: JointAngles) -> FlatPoint {
        self.local_xy_to_flat(self.local_tp_to_xy(self.shaft_to_local(tp)))
    }

    /// Shaft angles to the polar observation frame.
    pub fn shaft_to_polar(&self, tp: JointAngles) -> PolarCoord {
        PolarCoord::from_flat(&self.shaft_to_flat_xy(tp))
    }

    /// Solve a flattened-frame target back to shaft angles.
    ///
    /// `shaft_ranges` are the travel ranges in shaft terms; the solve runs
    /// in the observer frame (where the physical phi = 0 is seen) and the
    /// result is mapped back to shaft angles.
    pub fn flat_xy_to_shaft(&self, p: FlatPoint, shaft_ranges: [AxisRange; 2]) -> IkSolution {
        let local = self.flat_to_local_xy(p);
        let local_ranges = [
            shaft_ranges[0].shifted(self.calib.offset_t),
            shaft_ranges[1].shifted(self.calib.offset_p),
        ];
        let solved = inverse_kinematics(local, self.calib.r1, self.calib.r2, local_ranges);
        IkSolution {
            angles: self.local_to_shaft(solved.angles),
            reachable: solved.reachable,
        }
    }

    /// Solve a polar-frame target back to shaft angles.
    pub fn polar_to_shaft(&self, qs: PolarCoord, shaft_ranges: [AxisRange; 2]) -> IkSolution {
        self.flat_xy_to_shaft(qs.to_flat(), shaft_ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T_RANGE: AxisRange = AxisRange { min: -185.0, max: 185.0 };
    const P_RANGE: AxisRange = AxisRange { min: -1.9, max: 188.1 };
    const RANGES: [AxisRange; 2] = [T_RANGE, P_RANGE];

    #[test]
    fn test_fk_fully_extended() {
        let p = forward_kinematics(JointAngles::new(0.0, 0.0), 3.0, 3.0);
        assert!((p.x - 6.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn test_fk_ik_round_trip_over_grid() {
        let (r1, r2) = (3.0, 3.0);
        let mut theta = -170.0;
        while theta <= 170.0 {
            let mut phi = 5.0;
            while phi <= 175.0 {
                let tp = JointAngles::new(theta, phi);
                let xy = forward_kinematics(tp, r1, r2);
                let solved = inverse_kinematics(xy, r1, r2, RANGES);
                assert!(solved.reachable, "{tp} should be reachable");
                let back = forward_kinematics(solved.angles, r1, r2);
                assert!(
                    back.distance_to(&xy) < 1e-6,
                    "round trip failed at {tp}: {xy:?} vs {back:?}"
                );
                phi += 13.0;
            }
            theta += 17.0;
        }
    }

    #[test]
    fn test_ik_beyond_max_reach_is_closest_approach() {
        // Just past full extension: flagged unreachable, arm points at the
        // target fully extended.
        let solved = inverse_kinematics(FlatPoint::new(6.1, 0.0), 3.0, 3.0, RANGES);
        assert!(!solved.reachable);
        assert!(solved.angles.theta.abs() < 1e-6);
        assert!(solved.angles.phi.abs() < 1e-6);
    }

    #[test]
    fn test_ik_inside_inner_annulus() {
        let solved = inverse_kinematics(FlatPoint::new(0.2, 0.0), 3.0, 2.0, RANGES);
        assert!(!solved.reachable);
        // Closest approach sits on the inner annulus bound, radius 1.
        let p = forward_kinematics(solved.angles, 3.0, 2.0);
        assert!((p.hypot() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ik_prefers_central_theta() {
        // A bearing of -170° also admits theta = +190 - 360; the wrap pass
        // must keep whichever in-range candidate is nearest the center.
        let (r1, r2) = (3.0, 3.0);
        let tp = JointAngles::new(-170.0, 40.0);
        let xy = forward_kinematics(tp, r1, r2);
        let solved = inverse_kinematics(xy, r1, r2, RANGES);
        assert!(T_RANGE.contains(solved.angles.theta));
        let back = forward_kinematics(solved.angles, r1, r2);
        assert!(back.distance_to(&xy) < 1e-6);
    }

    #[test]
    fn test_wrap_angle_delta() {
        let range = AxisRange::new(-185.0, 185.0);
        // A -350° swing wraps to +10° when that stays in range.
        let wrapped = wrap_angle_delta(170.0, -350.0, range);
        assert_eq!(wrapped, 10.0);
        // Near the limit, the wrap would exceed the range: keep unwrapped.
        let kept = wrap_angle_delta(180.0, -350.0, range);
        assert_eq!(kept, -350.0);
        // Small deltas never wrap.
        assert_eq!(wrap_angle_delta(0.0, 15.0, range), 15.0);
    }

    #[test]
    fn test_offset_frames_round_trip() {
        let calib = CalibrationParams {
            offset_t: 10.0,
            offset_p: -2.0,
            offset_x: 100.0,
            offset_y: -50.0,
            ..Default::default()
        };
        let trans = Transforms::new(&calib);
        let tp = JointAngles::new(30.0, 90.0);
        let flat = trans.shaft_to_flat_xy(tp);
        let solved = trans.flat_xy_to_shaft(flat, RANGES);
        assert!(solved.reachable);
        let back = trans.shaft_to_flat_xy(solved.angles);
        assert!(back.distance_to(&flat) < 1e-6);
    }

    #[test]
    fn test_polar_frame() {
        let calib = CalibrationParams {
            offset_x: 30.0,
            ..Default::default()
        };
        let trans = Transforms::new(&calib);
        let qs = trans.shaft_to_polar(JointAngles::new(0.0, 0.0));
        assert!((qs.s - 36.0).abs() < 1e-9);
        assert!(qs.q.abs() < 1e-9);
    }
}
