//! Bidirectional weighted A* over the joint-angle grid.
//!
//! Two frontiers expand simultaneously, one from each endpoint, and the
//! search terminates on the first visited-set intersection. Tie-breaking
//! uses a monotonic insertion counter, so identical inputs always produce
//! bit-identical paths.

use crate::grid::{AngleGrid, GridCell};
use crate::heuristic::{DistanceField, Heuristic};
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Tunables for one search invocation.
#[derive(Clone, Copy, Debug)]
pub struct SearchParams {
    /// Heuristic distance measure.
    pub heuristic: Heuristic,
    /// Move-cost multiplier applied when a step changes discrete direction.
    pub weight_multiplier: f64,
    /// Expansion-round cap bounding worst-case latency.
    pub max_iterations: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::default(),
            weight_multiplier: 1.2,
            max_iterations: 200_000,
        }
    }
}

/// Terminal outcome of one search invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// Collision-free cell path from start to goal inclusive.
    PathFound(Vec<GridCell>),
    /// A frontier emptied, or the iteration cap was hit.
    NoPathFound,
    /// Start or goal cell is forbidden; caller decides fallback policy.
    InputRejected,
}

/// Heap entry; explicit total order on (f-cost, insertion sequence).
#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    f_cost: f64,
    seq: u64,
    cell: GridCell,
    g_cost: f64,
    parent: Option<GridCell>,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    // Reversed so the std max-heap pops the lowest f-cost, oldest entry.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// One direction of the bidirectional search.
struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    visited: HashMap<GridCell, Option<GridCell>>,
    enqueued: HashMap<GridCell, f64>,
    field: DistanceField,
    seq: u64,
}

impl Frontier {
    fn new(grid: &AngleGrid, origin: GridCell, target: GridCell, heuristic: Heuristic) -> Self {
        let field = DistanceField::new(grid, target, heuristic);
        let mut frontier = Self {
            heap: BinaryHeap::new(),
            visited: HashMap::new(),
            enqueued: HashMap::new(),
            field,
            seq: 0,
        };
        frontier.push(origin, 0.0, None);
        frontier
    }

    fn push(&mut self, cell: GridCell, g_cost: f64, parent: Option<GridCell>) {
        if let Some(&best) = self.enqueued.get(&cell) {
            if best <= g_cost {
                return;
            }
        }
        self.enqueued.insert(cell, g_cost);
        self.heap.push(FrontierEntry {
            f_cost: g_cost + self.field.get(cell),
            seq: self.seq,
            cell,
            g_cost,
            parent,
        });
        self.seq += 1;
    }

    /// Pop the best unvisited entry, mark it visited, and expand its open
    /// neighbors. Returns the settled cell, or `None` when exhausted.
    fn expand_one(&mut self, grid: &AngleGrid, weight: f64) -> Option<GridCell> {
        loop {
            let entry = self.heap.pop()?;
            if self.visited.contains_key(&entry.cell) {
                continue;
            }
            self.visited.insert(entry.cell, entry.parent);

            let prev_dir = entry
                .parent
                .map(|p| (entry.cell.i - p.i, entry.cell.j - p.j));
            for next in grid.open_neighbors(entry.cell) {
                if self.visited.contains_key(&next) {
                    continue;
                }
                let dir = (next.i - entry.cell.i, next.j - entry.cell.j);
                // Momentum: continuing straight is cheap, turning costs the
                // inertia weight.
                let step_cost = if prev_dir == Some(dir) { 1.0 } else { weight };
                self.push(next, entry.g_cost + step_cost, Some(entry.cell));
            }
            return Some(entry.cell);
        }
    }

    /// Walk parents from `cell` back to this frontier's origin, inclusive.
    fn trace_to_origin(&self, cell: GridCell) -> Vec<GridCell> {
        let mut path = vec![cell];
        let mut current = cell;
        while let Some(&Some(parent)) = self.visited.get(&current) {
            path.push(parent);
            current = parent;
        }
        path
    }
}

/// Run the bidirectional search between two cells.
///
/// Start == goal and out-of-grid endpoints are malformed input; forbidden
/// endpoints are the recoverable [`SearchResult::InputRejected`].
pub fn search(
    grid: &AngleGrid,
    start: GridCell,
    goal: GridCell,
    params: &SearchParams,
) -> Result<SearchResult> {
    if start == goal {
        return Err(Error::InvalidParameter(format!(
            "search start equals goal ({start:?})"
        )));
    }
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return Err(Error::InvalidParameter(format!(
            "search endpoints out of grid (start {start:?}, goal {goal:?})"
        )));
    }
    if grid.is_forbidden(start) || grid.is_forbidden(goal) {
        return Ok(SearchResult::InputRejected);
    }

    let weight = params.weight_multiplier;
    let mut forward = Frontier::new(grid, start, goal, params.heuristic);
    let mut backward = Frontier::new(grid, goal, start, params.heuristic);

    for _ in 0..params.max_iterations {
        let Some(settled_fwd) = forward.expand_one(grid, weight) else {
            return Ok(SearchResult::NoPathFound);
        };
        if backward.visited.contains_key(&settled_fwd) {
            return Ok(SearchResult::PathFound(join_paths(
                &forward, &backward, settled_fwd,
            )));
        }

        let Some(settled_bwd) = backward.expand_one(grid, weight) else {
            return Ok(SearchResult::NoPathFound);
        };
        if forward.visited.contains_key(&settled_bwd) {
            return Ok(SearchResult::PathFound(join_paths(
                &forward, &backward, settled_bwd,
            )));
        }
    }

    log::warn!(
        "search hit iteration cap ({}) between {start:?} and {goal:?}",
        params.max_iterations
    );
    Ok(SearchResult::NoPathFound)
}

/// Forward path to the meeting cell plus the backward half toward goal.
fn join_paths(forward: &Frontier, backward: &Frontier, meeting: GridCell) -> Vec<GridCell> {
    let mut path = forward.trace_to_origin(meeting);
    path.reverse();
    // Backward parents point toward the goal; skip the duplicated meeting
    // cell.
    path.extend(backward.trace_to_origin(meeting).into_iter().skip(1));
    path
}
