//! Grid-space heuristics for the bidirectional search.

use crate::grid::{AngleGrid, GridCell};
use serde::{Deserialize, Serialize};

/// Heuristic distance measure, selectable per planner configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    /// Theta-axis distance only.
    Theta,
    /// Phi-axis distance only.
    Phi,
    /// Straight-line distance in cell units.
    #[default]
    Euclidean,
    /// Axis-aligned distance in cell units.
    Manhattan,
}

impl Heuristic {
    /// Distance between two cells in grid units.
    #[inline]
    pub fn distance(self, a: GridCell, b: GridCell) -> f64 {
        let di = (a.i - b.i).abs() as f64;
        let dj = (a.j - b.j).abs() as f64;
        match self {
            Heuristic::Theta => di,
            Heuristic::Phi => dj,
            Heuristic::Euclidean => di.hypot(dj),
            Heuristic::Manhattan => di + dj,
        }
    }
}

/// Precomputed per-cell distance to one target cell.
#[derive(Clone, Debug)]
pub struct DistanceField {
    values: Vec<f64>,
    np: i32,
}

impl DistanceField {
    /// Evaluate `heuristic` against `target` over every cell of `grid`.
    pub fn new(grid: &AngleGrid, target: GridCell, heuristic: Heuristic) -> Self {
        let (nt, np) = grid.dims();
        let mut values = Vec::with_capacity((nt * np) as usize);
        for i in 0..nt {
            for j in 0..np {
                values.push(heuristic.distance(GridCell::new(i, j), target));
            }
        }
        Self { values, np }
    }

    /// Distance stored for a cell. Caller guarantees the cell is in bounds.
    #[inline]
    pub fn get(&self, cell: GridCell) -> f64 {
        self.values[(cell.i * self.np + cell.j) as usize]
    }
}
