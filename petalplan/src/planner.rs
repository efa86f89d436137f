//! Scheduler-facing planning facade.
//!
//! [`Planner::plan_move`] turns one joint-space target into an executable
//! [`MoveTable`], routing through the anticollision search only when the
//! straight move crosses forbidden territory. Degraded results are tagged
//! [`PlanOutcome`] variants, never errors; the caller owns fallback policy.

use crate::collision::CollisionGeometry;
use crate::condense::condense;
use crate::config::PlannerConfig;
use crate::error::{Error, Result};
use crate::grid::{AngleGrid, GridCell};
use crate::search::{search, SearchResult};
use petalkin::{
    wrap_angle_delta, Axis, FlatPoint, JointAngles, MoveSegment, MoveTable, Positioner,
    QuantizeOptions, Transforms,
};

/// Outcome of one planning request.
#[derive(Clone, Debug)]
pub enum PlanOutcome {
    /// Executable table reaching the (possibly truncated) target.
    Table(MoveTable),
    /// Target lies outside the kinematic annulus; the closest-approach
    /// angles are offered for the caller to accept or abort.
    Unreachable {
        /// Best achievable shaft angles.
        closest: JointAngles,
    },
    /// No collision-free path exists, or an endpoint is blocked.
    NoPathFound,
}

/// Anticollision move planner for one positioner at a time.
#[derive(Clone, Debug)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// Build a planner from a validated configuration.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a move to a joint-space target.
    ///
    /// The target is truncated to the positioner's travel ranges and each
    /// axis delta is wrapped across the ±360° discontinuity where that
    /// shortens it. If the straight joint-space run is clear of the
    /// forbidden grid the move goes direct; otherwise the bidirectional
    /// search supplies a detour, condensed into minimal legs. Backlash
    /// removal applies on the final leg of each axis only.
    pub fn plan_move(
        &self,
        positioner: &Positioner,
        target: JointAngles,
        geometry: &dyn CollisionGeometry,
    ) -> Result<PlanOutcome> {
        let pos = positioner.position();
        let mut goal = pos;
        for axis in Axis::ALL {
            let (admissible, truncated) = positioner.truncate_to_limits(axis, target[axis]);
            if truncated {
                log::debug!(
                    "positioner {}: {axis} target {} truncated to {admissible}",
                    positioner.id(),
                    target[axis]
                );
            }
            let delta = wrap_angle_delta(
                pos[axis],
                admissible - pos[axis],
                positioner.calib().full_range(axis),
            );
            goal[axis] = pos[axis] + delta;
        }

        // The grid spans the physical ranges so the tracked position is
        // always on-grid, even parked at a hardstop right after homing;
        // targets were already truncated to the clearance-shrunk ranges.
        let mut grid = AngleGrid::new(
            positioner.calib().full_range(Axis::Theta),
            positioner.calib().full_range(Axis::Phi),
            self.config.grid_step,
        )?;
        grid.mark_forbidden(geometry, self.config.tolerance_xy)?;

        let start_cell = grid
            .cell_for(pos)
            .ok_or_else(|| Error::InvalidParameter(format!("position {pos} off grid")))?;
        let goal_cell = grid
            .cell_for(goal)
            .ok_or_else(|| Error::InvalidParameter(format!("target {goal} off grid")))?;

        if start_cell == goal_cell || direct_run_is_clear(&grid, start_cell, goal_cell) {
            let mut table = MoveTable::new(pos);
            self.append_leg(&mut table, positioner, goal - pos, true);
            return Ok(PlanOutcome::Table(table));
        }

        log::debug!(
            "positioner {}: direct run blocked, searching {start_cell:?} -> {goal_cell:?}",
            positioner.id()
        );
        match search(&grid, start_cell, goal_cell, &self.config.search_params())? {
            SearchResult::PathFound(path) => {
                let legs = condense(&path);
                let mut table = MoveTable::new(pos);
                let mut reached = pos;
                for (idx, leg) in legs.iter().enumerate() {
                    let last = idx + 1 == legs.len();
                    // The final leg absorbs the sub-cell remainder so the
                    // table lands on the continuous goal, not a cell center.
                    let delta = if last {
                        goal - reached
                    } else {
                        JointAngles::new(
                            leg.dt as f64 * grid.step(),
                            leg.dp as f64 * grid.step(),
                        )
                    };
                    self.append_leg(&mut table, positioner, delta, last);
                    reached = reached + delta;
                }
                Ok(PlanOutcome::Table(table))
            }
            SearchResult::NoPathFound => {
                log::warn!(
                    "positioner {}: no collision-free path to {goal}",
                    positioner.id()
                );
                Ok(PlanOutcome::NoPathFound)
            }
            SearchResult::InputRejected => {
                log::warn!(
                    "positioner {}: planning endpoint inside forbidden zone",
                    positioner.id()
                );
                Ok(PlanOutcome::NoPathFound)
            }
        }
    }

    /// Plan a move to a flattened-frame Cartesian target.
    ///
    /// Runs inverse kinematics first; an unreachable point short-circuits
    /// to [`PlanOutcome::Unreachable`] without touching the grid.
    pub fn plan_move_to_point(
        &self,
        positioner: &Positioner,
        point: FlatPoint,
        geometry: &dyn CollisionGeometry,
    ) -> Result<PlanOutcome> {
        let transforms = Transforms::new(positioner.calib());
        // Solve against the physical ranges; clearance truncation happens
        // inside plan_move.
        let ranges = [
            positioner.calib().full_range(Axis::Theta),
            positioner.calib().full_range(Axis::Phi),
        ];
        let solved = transforms.flat_xy_to_shaft(point, ranges);
        if !solved.reachable {
            log::debug!(
                "positioner {}: point ({}, {}) unreachable, closest {}",
                positioner.id(),
                point.x,
                point.y,
                solved.angles
            );
            return Ok(PlanOutcome::Unreachable {
                closest: solved.angles,
            });
        }
        self.plan_move(positioner, solved.angles, geometry)
    }

    /// Quantize a raw per-axis distance for the external scheduler.
    ///
    /// No backlash pair is appended; callers wanting settle semantics go
    /// through [`Planner::plan_move`].
    pub fn quantize_axis_move(
        &self,
        positioner: &Positioner,
        axis: Axis,
        distance_deg: f64,
        allow_cruise: bool,
    ) -> Vec<MoveSegment> {
        positioner.quantize_joint_move(
            axis,
            distance_deg,
            QuantizeOptions {
                allow_cruise,
                backlash_removal: false,
            },
        )
    }

    fn append_leg(
        &self,
        table: &mut MoveTable,
        positioner: &Positioner,
        delta: JointAngles,
        final_leg: bool,
    ) {
        for axis in Axis::ALL {
            let options = QuantizeOptions {
                allow_cruise: true,
                backlash_removal: final_leg,
            };
            table.extend_axis(
                axis,
                positioner.quantize_joint_move(axis, delta[axis], options),
            );
        }
    }
}

/// Sample the straight cell run between two cells against the forbidden
/// grid.
fn direct_run_is_clear(grid: &AngleGrid, start: GridCell, goal: GridCell) -> bool {
    let di = goal.i - start.i;
    let dj = goal.j - start.j;
    let n = di.abs().max(dj.abs());
    if n == 0 {
        return !grid.is_forbidden(start);
    }
    for k in 0..=n {
        let f = k as f64 / n as f64;
        let cell = GridCell::new(
            start.i + (di as f64 * f).round() as i32,
            start.j + (dj as f64 * f).round() as i32,
        );
        if grid.is_forbidden(cell) {
            return false;
        }
    }
    true
}
