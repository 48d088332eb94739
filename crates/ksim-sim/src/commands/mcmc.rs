use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use ksim_mcmc::{run as run_ensemble, ChainConfig, ChainSummary, EnsembleRun, RunManifest};
use serde::Serialize;
use tracing::info;

use crate::output::{csv_writer, write_json};

#[derive(Args, Debug)]
pub struct McmcArgs {
    /// Optional YAML configuration; flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Iterations per chain.
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Starting value of every chain (must exceed 1).
    #[arg(long)]
    pub initial: Option<f64>,
    /// Master seed for the dataset and chains.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of independent chains.
    #[arg(long)]
    pub chains: Option<usize>,
    /// Samples discarded from the start of each chain.
    #[arg(long)]
    pub burn_in: Option<usize>,
    /// Worker threads (0 uses every core).
    #[arg(long)]
    pub threads: Option<usize>,
    /// Output directory for run artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct McmcSummary<'a> {
    master_seed: u64,
    data_points: usize,
    estimate: f64,
    reference: f64,
    absolute_error: f64,
    chains: &'a [ChainSummary],
}

const ARTEFACTS: [&str; 4] = ["samples.csv", "posterior.csv", "histogram.csv", "summary.json"];

pub fn run(args: &McmcArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(args)?;
    let ensemble = run_ensemble(&config)?;
    fs::create_dir_all(&args.out)?;

    write_samples(&args.out, &ensemble)?;
    write_posterior(&args.out, &ensemble)?;
    write_histogram(&args.out, &ensemble)?;
    write_json(
        args.out.join("summary.json"),
        &McmcSummary {
            master_seed: ensemble.master_seed,
            data_points: ensemble.data.len(),
            estimate: ensemble.estimate,
            reference: std::f64::consts::E,
            absolute_error: (ensemble.estimate - std::f64::consts::E).abs(),
            chains: &ensemble.summaries,
        },
    )?;

    let artefacts = ARTEFACTS.into_iter().map(PathBuf::from).collect();
    RunManifest::new(&config, &ensemble, artefacts).write(&args.out.join("manifest.json"))?;
    info!(
        estimate = ensemble.estimate,
        chains = config.chains,
        out = %args.out.display(),
        "sampler artefacts written"
    );
    Ok(())
}

fn resolve_config(args: &McmcArgs) -> Result<ChainConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => ChainConfig::load(path)?,
        None => ChainConfig::default(),
    };
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(initial) = args.initial {
        config.initial_value = initial;
    }
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    if let Some(chains) = args.chains {
        config.chains = chains;
    }
    if let Some(burn_in) = args.burn_in {
        config.burn_in = burn_in;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    config.validate()?;
    Ok(config)
}

/// One row per iteration, one column per chain.
fn write_samples(out: &Path, ensemble: &EnsembleRun) -> Result<(), Box<dyn Error>> {
    let mut writer = csv_writer(&out.join("samples.csv"))?;
    let mut header = vec!["iteration".to_string()];
    header.extend((0..ensemble.chains.len()).map(|index| format!("chain_{index}")));
    writer.write_record(&header)?;
    let iterations = ensemble.chains.first().map_or(0, |chain| chain.samples.len());
    for iteration in 0..iterations {
        let mut record = vec![iteration.to_string()];
        record.extend(
            ensemble
                .chains
                .iter()
                .map(|chain| chain.samples[iteration].to_string()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_posterior(out: &Path, ensemble: &EnsembleRun) -> Result<(), Box<dyn Error>> {
    let mut writer = csv_writer(&out.join("posterior.csv"))?;
    writer.write_record(["a", "unnormalized", "normalized"])?;
    for ((a, raw), normalized) in ensemble
        .grid
        .iter()
        .zip(&ensemble.posterior)
        .zip(&ensemble.normalized_posterior)
    {
        writer.write_record([a.to_string(), raw.to_string(), normalized.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_histogram(out: &Path, ensemble: &EnsembleRun) -> Result<(), Box<dyn Error>> {
    let histogram = &ensemble.histogram;
    let mut writer = csv_writer(&out.join("histogram.csv"))?;
    writer.write_record(["left", "right", "count", "density"])?;
    for (index, (count, density)) in histogram.counts.iter().zip(&histogram.density).enumerate() {
        writer.write_record([
            histogram.edges[index].to_string(),
            histogram.edges[index + 1].to_string(),
            count.to_string(),
            density.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
