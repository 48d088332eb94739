use ksim_core::errors::{ErrorInfo, SimError};
use ksim_core::RngHandle;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{histogram, retained_samples, ChainSummary, Histogram};
use crate::config::ChainConfig;
use crate::dataset::generate_dataset;
use crate::determinism;
use crate::kernel::{ChainRun, MetropolisHastings};
use crate::posterior::{normalized_posterior_curve, posterior_curve, posterior_grid};

/// Everything produced by a configured sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRun {
    /// Master seed all chains were derived from.
    pub master_seed: u64,
    /// Data the posterior was conditioned on.
    pub data: Vec<f64>,
    /// Raw chains, ordered by chain index.
    pub chains: Vec<ChainRun>,
    /// Per-chain summaries after burn-in.
    pub summaries: Vec<ChainSummary>,
    /// Mean of all retained samples across chains.
    pub estimate: f64,
    /// Grid on which the analytical posterior was evaluated.
    pub grid: Vec<f64>,
    /// Unnormalized posterior on `grid`.
    pub posterior: Vec<f64>,
    /// Posterior on `grid` scaled to unit area.
    pub normalized_posterior: Vec<f64>,
    /// Density histogram of all retained samples.
    pub histogram: Histogram,
}

impl EnsembleRun {
    /// Retained samples of every chain, concatenated in chain order.
    pub fn pooled_samples(&self, burn_in: usize) -> Result<Vec<f64>, SimError> {
        pool_retained(&self.chains, burn_in)
    }
}

fn pool_retained(chains: &[ChainRun], burn_in: usize) -> Result<Vec<f64>, SimError> {
    let mut pooled = Vec::new();
    for chain in chains {
        pooled.extend_from_slice(retained_samples(&chain.samples, burn_in)?);
    }
    Ok(pooled)
}

/// Runs every chain described by `config` and tabulates the analytical posterior.
///
/// Chain `i` draws from the substream `chain_seed(master_seed, i)`, so results
/// do not depend on the number of worker threads.
pub fn run(config: &ChainConfig) -> Result<EnsembleRun, SimError> {
    config.validate()?;
    let master_seed = config.seed_policy.master_seed;
    let data = match &config.dataset.values {
        Some(values) => values.clone(),
        None => {
            let mut rng = RngHandle::from_seed(determinism::dataset_seed(master_seed));
            generate_dataset(config.dataset.points, &mut rng)
        }
    };
    let sampler = MetropolisHastings::new(&data)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|err| SimError::Config(ErrorInfo::new("thread-pool", err.to_string())))?;
    let chains = pool.install(|| {
        (0..config.chains)
            .into_par_iter()
            .map(|index| {
                let mut rng = RngHandle::from_seed(determinism::chain_seed(master_seed, index));
                sampler.run(config.iterations, config.initial_value, &mut rng)
            })
            .collect::<Result<Vec<_>, SimError>>()
    })?;

    let summaries = chains
        .iter()
        .map(|chain| ChainSummary::from_run(chain, config.burn_in))
        .collect::<Result<Vec<_>, _>>()?;

    let pooled = pool_retained(&chains, config.burn_in)?;
    let estimate = pooled.iter().sum::<f64>() / pooled.len() as f64;
    let sample_histogram = histogram(&pooled, config.histogram_bins)?;

    let grid = posterior_grid(config.grid.start, config.grid.stop, config.grid.step)?;
    let posterior = posterior_curve(&grid, &data)?;
    let normalized_posterior = normalized_posterior_curve(&grid, &data)?;

    info!(
        chains = config.chains,
        iterations = config.iterations,
        data_points = data.len(),
        estimate,
        "sampling run complete"
    );
    Ok(EnsembleRun {
        master_seed,
        data,
        chains,
        summaries,
        estimate,
        grid,
        posterior,
        normalized_posterior,
        histogram: sample_histogram,
    })
}
