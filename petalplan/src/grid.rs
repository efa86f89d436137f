//! Discretized joint-angle grid with forbidden-cell marking.
//!
//! One [`AngleGrid`] exists per planning call. It spans the positioner's
//! targetable (theta, phi) envelope at a fixed angular step and carries the
//! boolean forbidden mask derived from neighbor geometry.

use crate::collision::CollisionGeometry;
use crate::error::{Error, Result};
use petalkin::{AxisRange, JointAngles};

/// Integer (theta, phi) grid coordinate, local to one planning call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    /// Theta index.
    pub i: i32,
    /// Phi index.
    pub j: i32,
}

impl GridCell {
    /// Build from indices.
    #[inline]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }
}

/// 8-connected neighbor offsets, fixed order for deterministic expansion.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Discretized joint-angle envelope with a forbidden mask.
#[derive(Clone, Debug)]
pub struct AngleGrid {
    t_min: f64,
    t_max: f64,
    p_min: f64,
    p_max: f64,
    step: f64,
    nt: i32,
    np: i32,
    forbidden: Vec<bool>,
}

impl AngleGrid {
    /// Build an all-clear grid spanning the two axis ranges at `step`
    /// degrees per cell.
    pub fn new(theta: AxisRange, phi: AxisRange, step: f64) -> Result<Self> {
        if step <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "grid step must be positive, got {step}"
            )));
        }
        if theta.span() <= 0.0 || phi.span() <= 0.0 {
            return Err(Error::InvalidParameter(
                "axis ranges must have positive span".into(),
            ));
        }
        let nt = (theta.span() / step).floor() as i32 + 1;
        let np = (phi.span() / step).floor() as i32 + 1;
        Ok(Self {
            t_min: theta.min,
            t_max: theta.max,
            p_min: phi.min,
            p_max: phi.max,
            step,
            nt,
            np,
            forbidden: vec![false; (nt * np) as usize],
        })
    }

    /// Grid dimensions (theta cells, phi cells).
    #[inline]
    pub fn dims(&self) -> (i32, i32) {
        (self.nt, self.np)
    }

    /// Angular step per cell, degrees.
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Whether a cell lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.i >= 0 && cell.i < self.nt && cell.j >= 0 && cell.j < self.np
    }

    /// Nearest cell for a joint-angle pair, or `None` outside the envelope.
    ///
    /// When the range span is not a whole multiple of the step, angles in
    /// the fractional tail past the last cell center clamp onto the
    /// boundary cell, so every in-range angle maps to a cell.
    pub fn cell_for(&self, angles: JointAngles) -> Option<GridCell> {
        let in_range = angles.theta >= self.t_min
            && angles.theta <= self.t_max
            && angles.phi >= self.p_min
            && angles.phi <= self.p_max;
        if !in_range {
            return None;
        }
        Some(GridCell::new(
            (((angles.theta - self.t_min) / self.step).round() as i32).clamp(0, self.nt - 1),
            (((angles.phi - self.p_min) / self.step).round() as i32).clamp(0, self.np - 1),
        ))
    }

    /// Joint angles at a cell center.
    #[inline]
    pub fn angles_at(&self, cell: GridCell) -> JointAngles {
        JointAngles::new(
            self.t_min + cell.i as f64 * self.step,
            self.p_min + cell.j as f64 * self.step,
        )
    }

    #[inline]
    fn index(&self, cell: GridCell) -> usize {
        (cell.i * self.np + cell.j) as usize
    }

    /// Whether a cell is marked forbidden. Out-of-bounds counts as
    /// forbidden so edge handling needs no special cases.
    #[inline]
    pub fn is_forbidden(&self, cell: GridCell) -> bool {
        !self.in_bounds(cell) || self.forbidden[self.index(cell)]
    }

    /// Mark one cell forbidden.
    pub fn forbid(&mut self, cell: GridCell) {
        if self.in_bounds(cell) {
            let idx = self.index(cell);
            self.forbidden[idx] = true;
        }
    }

    /// Mark an entire theta row forbidden.
    pub fn forbid_row(&mut self, i: i32) {
        if i >= 0 && i < self.nt {
            let base = (i * self.np) as usize;
            for slot in &mut self.forbidden[base..base + self.np as usize] {
                *slot = true;
            }
        }
    }

    /// Number of forbidden cells.
    pub fn forbidden_count(&self) -> usize {
        self.forbidden.iter().filter(|&&f| f).count()
    }

    /// Fill the forbidden mask from a collision snapshot.
    ///
    /// A cell is forbidden when any vertex of the arm outline at that
    /// (theta, phi) lies within `tolerance` of the neighbor sweep. A
    /// central-body hit at some theta forbids the whole row, since no phi
    /// can clear it.
    pub fn mark_forbidden(
        &mut self,
        geometry: &dyn CollisionGeometry,
        tolerance: f64,
    ) -> Result<()> {
        if tolerance < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "collision tolerance must be non-negative, got {tolerance}"
            )));
        }
        for i in 0..self.nt {
            let theta = self.t_min + i as f64 * self.step;
            let body = geometry.body_polygon_at(theta);
            if body.any_vertex(|v| geometry.point_in_neighbor_sweep(v, tolerance)) {
                self.forbid_row(i);
                continue;
            }
            for j in 0..self.np {
                let phi = self.p_min + j as f64 * self.step;
                let arm = geometry.arm_polygon_at(theta, phi);
                if arm.any_vertex(|v| geometry.point_in_neighbor_sweep(v, tolerance)) {
                    self.forbid(GridCell::new(i, j));
                }
            }
        }
        log::debug!(
            "forbidden grid: {}/{} cells blocked",
            self.forbidden_count(),
            (self.nt * self.np)
        );
        Ok(())
    }

    /// In-bounds, non-forbidden 8-connected neighbors of a cell, in the
    /// fixed [`NEIGHBOR_OFFSETS`] order.
    pub fn open_neighbors(&self, cell: GridCell) -> impl Iterator<Item = GridCell> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(di, dj)| GridCell::new(cell.i + di, cell.j + dj))
            .filter(|&c| !self.is_forbidden(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::NeighborPointField;
    use petalkin::FlatPoint;

    fn open_grid() -> AngleGrid {
        AngleGrid::new(
            AxisRange::new(-180.0, 180.0),
            AxisRange::new(0.0, 180.0),
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_cell_round_trip() {
        let grid = open_grid();
        let angles = JointAngles::new(-10.0, 90.0);
        let cell = grid.cell_for(angles).unwrap();
        assert_eq!(grid.angles_at(cell), angles);
        assert!(grid.cell_for(JointAngles::new(500.0, 0.0)).is_none());
    }

    #[test]
    fn test_fractional_span_covers_range_top() {
        let grid = AngleGrid::new(
            AxisRange::new(0.0, 10.5),
            AxisRange::new(0.0, 10.0),
            1.0,
        )
        .unwrap();
        // The tail past the last cell center clamps to the boundary cell.
        let cell = grid.cell_for(JointAngles::new(10.5, 5.0)).unwrap();
        assert_eq!(cell, GridCell::new(10, 5));
        assert!(grid.cell_for(JointAngles::new(10.6, 5.0)).is_none());
    }

    #[test]
    fn test_out_of_bounds_is_forbidden() {
        let grid = open_grid();
        assert!(grid.is_forbidden(GridCell::new(-1, 0)));
        assert!(!grid.is_forbidden(GridCell::new(0, 0)));
    }

    #[test]
    fn test_forbid_row() {
        let mut grid = open_grid();
        grid.forbid_row(3);
        let (_, np) = grid.dims();
        for j in 0..np {
            assert!(grid.is_forbidden(GridCell::new(3, j)));
        }
        assert!(!grid.is_forbidden(GridCell::new(4, 0)));
    }

    #[test]
    fn test_open_neighbors_skip_forbidden() {
        let mut grid = open_grid();
        let cell = GridCell::new(10, 10);
        grid.forbid(GridCell::new(9, 10));
        let neighbors: Vec<_> = grid.open_neighbors(cell).collect();
        assert_eq!(neighbors.len(), 7);
        assert!(!neighbors.contains(&GridCell::new(9, 10)));
    }

    #[test]
    fn test_mark_forbidden_rejects_negative_tolerance() {
        let mut grid = open_grid();
        let field = NeighborPointField::empty(FlatPoint::ZERO, 3.0, 3.0, 0.5).unwrap();
        assert!(grid.mark_forbidden(&field, -0.1).is_err());
    }

    #[test]
    fn test_mark_forbidden_blocks_near_neighbor() {
        // Neighbor point sits right where the fully extended arm reaches
        // along +x, so theta=0/phi=0 must be forbidden while the folded
        // configuration stays clear.
        let mut grid = AngleGrid::new(
            AxisRange::new(-180.0, 180.0),
            AxisRange::new(0.0, 180.0),
            5.0,
        )
        .unwrap();
        let field = NeighborPointField::new(
            vec![3],
            vec![FlatPoint::new(6.0, 0.0)],
            FlatPoint::ZERO,
            3.0,
            3.0,
            0.1,
        )
        .unwrap();
        grid.mark_forbidden(&field, 0.3).unwrap();
        let extended = grid.cell_for(JointAngles::new(0.0, 0.0)).unwrap();
        let folded = grid.cell_for(JointAngles::new(0.0, 180.0)).unwrap();
        assert!(grid.is_forbidden(extended));
        assert!(!grid.is_forbidden(folded));
        assert!(grid.forbidden_count() > 0);
    }
}
