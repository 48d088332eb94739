use std::fs;
use std::path::Path;

use ksim_core::errors::{ErrorInfo, SimError};
use serde::{Deserialize, Serialize};

use crate::analysis::{BinRule, MAX_HISTOGRAM_BINS};
use crate::posterior::{grid_point_count, MAX_GRID_POINTS};

/// YAML-configurable parameters governing a sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Iterations per chain; every iteration records one sample.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Starting value of every chain. Must exceed 1.
    #[serde(default = "default_initial_value")]
    pub initial_value: f64,
    /// Leading samples of each chain excluded from summaries and histograms.
    #[serde(default)]
    pub burn_in: usize,
    /// Number of independent chains.
    #[serde(default = "default_chains")]
    pub chains: usize,
    /// Worker threads for independent chains (0 lets the pool decide).
    #[serde(default)]
    pub threads: usize,
    /// Observed or synthesized data.
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Grid on which the analytical posterior is tabulated.
    #[serde(default)]
    pub grid: GridConfig,
    /// Binning of the pooled sample histogram.
    #[serde(default)]
    pub histogram_bins: BinRule,
    /// Master seed and label.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_iterations() -> usize {
    20_000
}

fn default_initial_value() -> f64 {
    10.0
}

fn default_chains() -> usize {
    1
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            initial_value: default_initial_value(),
            burn_in: 0,
            chains: default_chains(),
            threads: 0,
            dataset: DatasetConfig::default(),
            grid: GridConfig::default(),
            histogram_bins: BinRule::default(),
            seed_policy: SeedPolicy::default(),
        }
    }
}

/// Source of the data the posterior is conditioned on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Number of unit-normal points to synthesize when `values` is absent.
    #[serde(default = "default_points")]
    pub points: usize,
    /// Explicit observations; overrides `points`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
}

fn default_points() -> usize {
    100
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            points: default_points(),
            values: None,
        }
    }
}

/// Half-open grid `[start, stop)` with a fixed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// First grid point. Must exceed 1.
    #[serde(default = "default_grid_start")]
    pub start: f64,
    /// Exclusive upper bound.
    #[serde(default = "default_grid_stop")]
    pub stop: f64,
    /// Spacing between points.
    #[serde(default = "default_grid_step")]
    pub step: f64,
}

fn default_grid_start() -> f64 {
    1.5
}

fn default_grid_stop() -> f64 {
    6.0
}

fn default_grid_step() -> f64 {
    0.01
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start: default_grid_start(),
            stop: default_grid_stop(),
            step: default_grid_step(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed from which dataset and chain seeds are derived.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D0E0_2718_2818_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

impl ChainConfig {
    /// Parses a configuration from YAML text and validates it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|err| SimError::Config(ErrorInfo::new("chain-config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SimError::Config(
                ErrorInfo::new("chain-config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Checks cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.initial_value > 1.0 && self.initial_value.is_finite()) {
            return Err(config_error(
                "initial-value",
                "initial_value must be finite and greater than 1",
                "initial_value",
                self.initial_value,
            ));
        }
        if self.iterations == 0 {
            return Err(config_error(
                "iterations",
                "at least one iteration is required",
                "iterations",
                0,
            ));
        }
        if self.burn_in >= self.iterations {
            return Err(config_error(
                "burn-in",
                "burn_in must leave at least one sample",
                "burn_in",
                self.burn_in,
            ));
        }
        if self.chains == 0 {
            return Err(config_error("chains", "at least one chain is required", "chains", 0));
        }
        if !(self.grid.start > 1.0 && self.grid.start.is_finite()) {
            return Err(config_error(
                "grid-start",
                "grid must start above 1, where the posterior is defined",
                "start",
                self.grid.start,
            ));
        }
        if !(self.grid.step > 0.0 && self.grid.step.is_finite()) {
            return Err(config_error(
                "grid-step",
                "grid step must be finite and positive",
                "step",
                self.grid.step,
            ));
        }
        if !(self.grid.stop > self.grid.start && self.grid.stop.is_finite()) {
            return Err(config_error(
                "grid-stop",
                "grid stop must be finite and above start",
                "stop",
                self.grid.stop,
            ));
        }
        let points = grid_point_count(self.grid.start, self.grid.stop, self.grid.step);
        if points > MAX_GRID_POINTS as f64 {
            return Err(config_error(
                "grid-too-large",
                "grid step is too fine for the configured range",
                "points",
                points,
            ));
        }
        match self.histogram_bins {
            BinRule::Fixed { bins: 0 } => {
                return Err(config_error("histogram-bins", "bin count must be positive", "bins", 0));
            }
            BinRule::Fixed { bins } if bins > MAX_HISTOGRAM_BINS => {
                return Err(config_error(
                    "histogram-bins",
                    "bin count exceeds the limit",
                    "bins",
                    bins,
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

fn config_error(code: &str, message: &str, key: &str, value: impl ToString) -> SimError {
    SimError::Config(ErrorInfo::new(code, message).with_context(key, value))
}
