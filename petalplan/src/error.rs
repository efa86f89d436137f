//! Error types for petalplan.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Planning error type.
///
/// Routine degraded outcomes (unreachable target, no path found) are not
/// errors; they are carried by [`crate::planner::PlanOutcome`]. These
/// variants cover malformed input and configuration problems only.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied parameter is out of its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Kinematics or calibration failure from the positioner layer.
    #[error("kinematics error: {0}")]
    Kinematics(#[from] petalkin::Error),

    /// The planner worker pool has shut down.
    #[error("planner pool disconnected")]
    PoolDisconnected,

    /// Planner config parse error.
    #[error("planner config error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error while reading config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
