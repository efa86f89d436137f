//! Condensation of cell paths into minimal joint deltas.

use crate::grid::GridCell;

/// One condensed joint-space move, in grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathDelta {
    /// Theta cells moved.
    pub dt: i32,
    /// Phi cells moved.
    pub dp: i32,
}

/// Merge runs of identical consecutive per-step deltas and drop zeros.
///
/// A pure-axis path of any length condenses to a single entry; a path
/// shorter than two cells condenses to nothing.
pub fn condense(path: &[GridCell]) -> Vec<PathDelta> {
    let mut deltas: Vec<PathDelta> = Vec::new();
    for pair in path.windows(2) {
        let step = (pair[1].i - pair[0].i, pair[1].j - pair[0].j);
        if step == (0, 0) {
            continue;
        }
        match deltas.last_mut() {
            // Same discrete direction as the running segment: extend it.
            Some(last) if same_direction(last, step) => {
                last.dt += step.0;
                last.dp += step.1;
            }
            _ => deltas.push(PathDelta {
                dt: step.0,
                dp: step.1,
            }),
        }
    }
    deltas
}

fn same_direction(run: &PathDelta, step: (i32, i32)) -> bool {
    // A run of n identical unit steps has delta (n·di, n·dj); the next step
    // continues it when the per-step direction matches.
    let n = run.dt.abs().max(run.dp.abs());
    n > 0 && run.dt == n * step.0 && run.dp == n * step.1
}
