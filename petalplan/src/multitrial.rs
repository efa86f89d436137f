//! Diagnostic multi-trial search comparison.
//!
//! Reruns one search problem under every configured heuristic/weight pair
//! and reports path statistics per combination. Purely observational: the
//! production planning result is chosen elsewhere and never altered here.

use crate::condense::condense;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::grid::{AngleGrid, GridCell};
use crate::heuristic::Heuristic;
use crate::search::{search, SearchParams, SearchResult};

/// Statistics from one heuristic/weight trial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialReport {
    /// Heuristic used for the trial.
    pub heuristic: Heuristic,
    /// Inertia weight used for the trial.
    pub weight: f64,
    /// Whether a path was found.
    pub found: bool,
    /// Raw path length in cells (0 when not found).
    pub full_len: usize,
    /// Condensed leg count (0 when not found).
    pub condensed_len: usize,
}

/// Run every configured heuristic/weight combination over one problem.
pub fn run_trials(
    grid: &AngleGrid,
    start: GridCell,
    goal: GridCell,
    config: &PlannerConfig,
) -> Result<Vec<TrialReport>> {
    let mut reports =
        Vec::with_capacity(config.trial_heuristics.len() * config.trial_weights.len());
    for &heuristic in &config.trial_heuristics {
        for &weight in &config.trial_weights {
            let params = SearchParams {
                heuristic,
                weight_multiplier: weight,
                max_iterations: config.max_iterations,
            };
            let report = match search(grid, start, goal, &params)? {
                SearchResult::PathFound(path) => TrialReport {
                    heuristic,
                    weight,
                    found: true,
                    full_len: path.len(),
                    condensed_len: condense(&path).len(),
                },
                SearchResult::NoPathFound | SearchResult::InputRejected => TrialReport {
                    heuristic,
                    weight,
                    found: false,
                    full_len: 0,
                    condensed_len: 0,
                },
            };
            log::debug!(
                "trial {:?} w={}: found={} cells={} legs={}",
                report.heuristic,
                report.weight,
                report.found,
                report.full_len,
                report.condensed_len
            );
            reports.push(report);
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petalkin::AxisRange;

    #[test]
    fn test_all_combinations_reported() {
        let grid = AngleGrid::new(
            AxisRange::new(0.0, 20.0),
            AxisRange::new(0.0, 20.0),
            1.0,
        )
        .unwrap();
        let config = PlannerConfig::default();
        let reports = run_trials(
            &grid,
            GridCell::new(1, 1),
            GridCell::new(15, 15),
            &config,
        )
        .unwrap();
        assert_eq!(
            reports.len(),
            config.trial_heuristics.len() * config.trial_weights.len()
        );
        assert!(reports.iter().all(|r| r.found && r.full_len >= 15));
    }
}
