//! Cartesian and polar focal-plane coordinate types.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in the flattened focal-plane frame, in millimetres.
///
/// The same type serves for positioner-local coordinates (centered on the
/// theta axis) and for petal-global flattened coordinates; transforms
/// between the two are a pure translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatPoint {
    /// X coordinate in mm.
    pub x: f64,
    /// Y coordinate in mm.
    pub y: f64,
}

impl FlatPoint {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin.
    pub const ZERO: FlatPoint = FlatPoint { x: 0.0, y: 0.0 };

    /// Radial distance from the origin.
    #[inline]
    pub fn hypot(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: &FlatPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for FlatPoint {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for FlatPoint {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Polar observation coordinates over the flattened focal plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarCoord {
    /// Angle about the optical axis, in degrees.
    pub q: f64,
    /// Radial distance from the optical axis, in mm.
    pub s: f64,
}

impl PolarCoord {
    /// Create a new polar coordinate.
    #[inline]
    pub fn new(q: f64, s: f64) -> Self {
        Self { q, s }
    }

    /// Convert to Cartesian flattened coordinates.
    #[inline]
    pub fn to_flat(&self) -> FlatPoint {
        let q_rad = self.q.to_radians();
        FlatPoint::new(self.s * q_rad.cos(), self.s * q_rad.sin())
    }

    /// Build from Cartesian flattened coordinates.
    #[inline]
    pub fn from_flat(p: &FlatPoint) -> Self {
        Self::new(p.y.atan2(p.x).to_degrees(), p.hypot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_round_trip() {
        let p = FlatPoint::new(3.0, 4.0);
        let qs = PolarCoord::from_flat(&p);
        assert!((qs.s - 5.0).abs() < 1e-12);
        let back = qs.to_flat();
        assert!(back.distance_to(&p) < 1e-12);
    }

    #[test]
    fn test_distance() {
        let a = FlatPoint::new(1.0, 1.0);
        let b = FlatPoint::new(4.0, 5.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }
}
