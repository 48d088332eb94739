#![deny(missing_docs)]

//! Bayesian estimation of Euler's number with a Metropolis-Hastings chain.
//!
//! Data `x_i` are modelled as `P(x | a) = N(a) a^(-x^2 / 2)` with
//! `N(a) = sqrt(ln(a) / (2 pi))`, which is a unit normal exactly when `a = e`.
//! The prior is flat on `a > 1` and zero elsewhere, so the unnormalized
//! posterior over `a` depends on the data only through `sum x_i^2` and `n`.

/// Chain diagnostics and sample histograms.
pub mod analysis;
/// YAML configuration schema and defaults.
pub mod config;
/// Synthetic dataset generation.
pub mod dataset;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Parallel execution of independent chains.
pub mod ensemble;
/// The Metropolis-Hastings kernel.
pub mod kernel;
/// Run manifest serialization helpers.
pub mod manifest;
/// Posterior density and grid evaluation.
pub mod posterior;

pub use analysis::{histogram, BinRule, ChainSummary, Histogram, MAX_HISTOGRAM_BINS};
pub use config::{ChainConfig, DatasetConfig, GridConfig, SeedPolicy};
pub use dataset::generate_dataset;
pub use ensemble::{run, EnsembleRun};
pub use kernel::{run_chain, ChainRun, MetropolisHastings};
pub use manifest::RunManifest;
pub use posterior::{
    log_unnormalized_posterior, normalized_posterior_curve, posterior_curve, posterior_grid,
    unnormalized_posterior, MAX_GRID_POINTS,
};
