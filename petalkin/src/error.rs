//! Error types for petalkin.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinematics and calibration error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied parameter is out of its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No calibration entry exists for the requested positioner.
    #[error("no calibration for positioner {0}")]
    MissingCalibration(u32),

    /// Calibration file parse error.
    #[error("calibration config error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error while reading calibration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
