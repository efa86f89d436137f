//! Travel-range handling for a single positioner axis.

use serde::{Deserialize, Serialize};

/// An inclusive [min, max] angular travel range in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    /// Lower travel limit in degrees.
    pub min: f64,
    /// Upper travel limit in degrees.
    pub max: f64,
}

impl AxisRange {
    /// Create a new range. Callers are expected to pass `min <= max`;
    /// validation happens where calibration is ingested.
    #[inline]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Total angular span in degrees.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Midpoint of the range.
    #[inline]
    pub fn center(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    /// Whether `angle` lies inside the range (inclusive).
    #[inline]
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }

    /// Clamp `angle` to the nearest bound.
    #[inline]
    pub fn clamp(&self, angle: f64) -> f64 {
        angle.clamp(self.min, self.max)
    }

    /// Shrink the range by directional clearances.
    ///
    /// `low` and `high` are the amounts to pull in from the respective
    /// bounds; both are magnitudes.
    #[inline]
    pub fn shrunk(&self, low: f64, high: f64) -> Self {
        Self::new(self.min + low, self.max - high)
    }

    /// Shift the whole range by `offset` degrees.
    #[inline]
    pub fn shifted(&self, offset: f64) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basics() {
        let r = AxisRange::new(-185.0, 185.0);
        assert_eq!(r.span(), 370.0);
        assert_eq!(r.center(), 0.0);
        assert!(r.contains(185.0));
        assert!(!r.contains(185.1));
        assert_eq!(r.clamp(200.0), 185.0);
    }

    #[test]
    fn test_shrunk() {
        let r = AxisRange::new(0.0, 190.0).shrunk(3.0, 6.0);
        assert_eq!(r.min, 3.0);
        assert_eq!(r.max, 184.0);
    }
}
