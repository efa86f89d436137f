//! Collision-aware joint-space planning for fiber positioners.
//!
//! Builds on `petalkin` (kinematics, quantization) and adds the
//! multi-positioner safety layer:
//!
//! - the collision-geometry trait boundary and a point-cloud
//!   implementation ([`collision`])
//! - the discretized joint-angle grid with forbidden-cell marking
//!   ([`grid`])
//! - bidirectional weighted A* with momentum costs and deterministic
//!   tie-breaking ([`search`])
//! - path condensation into minimal joint legs ([`condense`])
//! - the scheduler-facing planner facade ([`planner`]) and a worker pool
//!   for parallel per-positioner planning ([`pool`])
//! - a multi-trial diagnostic comparing heuristic/weight pairs
//!   ([`multitrial`])

pub mod collision;
pub mod condense;
pub mod config;
pub mod error;
pub mod grid;
pub mod heuristic;
pub mod multitrial;
pub mod planner;
pub mod pool;
pub mod search;

pub use collision::{CollisionGeometry, NeighborPointField, Polygon};
pub use condense::{condense, PathDelta};
pub use config::PlannerConfig;
pub use error::{Error, Result};
pub use grid::{AngleGrid, GridCell};
pub use heuristic::{DistanceField, Heuristic};
pub use multitrial::{run_trials, TrialReport};
pub use planner::{PlanOutcome, Planner};
pub use pool::{PlanRequest, PlanResponse, PlannerPool};
pub use search::{search, SearchParams, SearchResult};
