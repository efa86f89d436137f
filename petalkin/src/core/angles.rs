//! Joint-angle types for the two-link positioner arm.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Index, IndexMut, Neg, Sub};

/// The two joint axes of a positioner.
///
/// `Theta` is the central rotation, `Phi` the elbow rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Central-body rotation axis.
    Theta,
    /// Eccentric (elbow) rotation axis.
    Phi,
}

impl Axis {
    /// Both axes, in canonical order.
    pub const ALL: [Axis; 2] = [Axis::Theta, Axis::Phi];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Theta => write!(f, "theta"),
            Axis::Phi => write!(f, "phi"),
        }
    }
}

/// A (theta, phi) angle pair in degrees.
///
/// Used both for absolute shaft positions and for relative deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    /// Central axis angle in degrees.
    pub theta: f64,
    /// Elbow axis angle in degrees.
    pub phi: f64,
}

impl JointAngles {
    /// Create a new angle pair.
    #[inline]
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Zero angles.
    pub const ZERO: JointAngles = JointAngles { theta: 0.0, phi: 0.0 };

    /// Largest per-axis absolute difference to another pair, in degrees.
    #[inline]
    pub fn max_abs_diff(&self, other: &JointAngles) -> f64 {
        (self.theta - other.theta)
            .abs()
            .max((self.phi - other.phi).abs())
    }
}

impl Index<Axis> for JointAngles {
    type Output = f64;

    #[inline]
    fn index(&self, axis: Axis) -> &f64 {
        match axis {
            Axis::Theta => &self.theta,
            Axis::Phi => &self.phi,
        }
    }
}

impl IndexMut<Axis> for JointAngles {
    #[inline]
    fn index_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Theta => &mut self.theta,
            Axis::Phi => &mut self.phi,
        }
    }
}

impl Add for JointAngles {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.theta + other.theta, self.phi + other.phi)
    }
}

impl Sub for JointAngles {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.theta - other.theta, self.phi - other.phi)
    }
}

impl Neg for JointAngles {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.theta, -self.phi)
    }
}

impl fmt::Display for JointAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(t={:.3}\u{b0}, p={:.3}\u{b0})", self.theta, self.phi)
    }
}
