//! Planner configuration.

use crate::error::{Error, Result};
use crate::heuristic::Heuristic;
use crate::search::SearchParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_weight() -> f64 {
    1.2
}
fn default_tolerance_xy() -> f64 {
    0.4
}
fn default_grid_step() -> f64 {
    1.0
}
fn default_max_iterations() -> u64 {
    200_000
}
fn default_trial_heuristics() -> Vec<Heuristic> {
    vec![
        Heuristic::Theta,
        Heuristic::Phi,
        Heuristic::Euclidean,
        Heuristic::Manhattan,
    ]
}
fn default_trial_weights() -> Vec<f64> {
    vec![1.2, 1.5, 2.0]
}

/// Tunables for the anticollision planner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Heuristic used for production planning.
    #[serde(default)]
    pub heuristic: Heuristic,
    /// Inertia penalty applied to direction changes (>= 1).
    #[serde(default = "default_weight")]
    pub weight_multiplier: f64,
    /// Collision clearance around neighbor points, mm.
    #[serde(default = "default_tolerance_xy")]
    pub tolerance_xy: f64,
    /// Grid cell size, degrees.
    #[serde(default = "default_grid_step")]
    pub grid_step: f64,
    /// Expansion-round cap for one search.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// Heuristics exercised by the multi-trial diagnostic.
    #[serde(default = "default_trial_heuristics")]
    pub trial_heuristics: Vec<Heuristic>,
    /// Weights exercised by the multi-trial diagnostic.
    #[serde(default = "default_trial_weights")]
    pub trial_weights: Vec<f64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::default(),
            weight_multiplier: default_weight(),
            tolerance_xy: default_tolerance_xy(),
            grid_step: default_grid_step(),
            max_iterations: default_max_iterations(),
            trial_heuristics: default_trial_heuristics(),
            trial_weights: default_trial_weights(),
        }
    }
}

impl PlannerConfig {
    /// Load from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values against their physical domains.
    pub fn validate(&self) -> Result<()> {
        if self.weight_multiplier < 1.0 {
            return Err(Error::InvalidParameter(format!(
                "weight_multiplier must be >= 1, got {}",
                self.weight_multiplier
            )));
        }
        if self.tolerance_xy < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "tolerance_xy must be non-negative, got {}",
                self.tolerance_xy
            )));
        }
        if self.grid_step <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "grid_step must be positive, got {}",
                self.grid_step
            )));
        }
        Ok(())
    }

    /// Search tunables for the production heuristic/weight pair.
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            heuristic: self.heuristic,
            weight_multiplier: self.weight_multiplier,
            max_iterations: self.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.heuristic, Heuristic::Euclidean);
        assert_eq!(config.weight_multiplier, 1.2);
        assert_eq!(config.tolerance_xy, 0.4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let text = r#"
            heuristic = "manhattan"
            weight_multiplier = 1.8
        "#;
        let config: PlannerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.heuristic, Heuristic::Manhattan);
        assert_eq!(config.weight_multiplier, 1.8);
        assert_eq!(config.grid_step, 1.0);
    }

    #[test]
    fn test_validate_rejects_sub_unit_weight() {
        let config = PlannerConfig {
            weight_multiplier: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
