use ksim_core::errors::{ErrorInfo, SimError};
use serde::{Deserialize, Serialize};

use crate::kernel::ChainRun;

/// Largest bin count accepted by [`histogram`].
pub const MAX_HISTOGRAM_BINS: usize = 100_000;

/// Strategy for choosing histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BinRule {
    /// Narrower of the Sturges and Freedman-Diaconis widths.
    #[default]
    Auto,
    /// Fixed number of equal-width bins.
    Fixed {
        /// Number of bins.
        bins: usize,
    },
}

/// Equal-width histogram of chain samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges; `edges.len() == counts.len() + 1`.
    pub edges: Vec<f64>,
    /// Samples per bin. The last bin includes its right edge.
    pub counts: Vec<usize>,
    /// Counts scaled so the histogram integrates to one.
    pub density: Vec<f64>,
}

/// Descriptive statistics of a chain after burn-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Iterations the chain ran for.
    pub iterations: usize,
    /// Leading samples discarded.
    pub burn_in: usize,
    /// Sample mean after burn-in; the point estimate of `e`.
    pub mean: f64,
    /// Sample standard deviation after burn-in.
    pub std_dev: f64,
    /// Smallest retained sample.
    pub min: f64,
    /// Largest retained sample.
    pub max: f64,
    /// Fraction of all proposals accepted.
    pub acceptance_rate: f64,
    /// Fraction of all proposals landing at or below 1.
    pub out_of_support_rate: f64,
}

impl ChainSummary {
    /// Summarizes a chain, skipping the first `burn_in` samples.
    pub fn from_run(run: &ChainRun, burn_in: usize) -> Result<Self, SimError> {
        let retained = retained_samples(&run.samples, burn_in)?;
        let (mean, std_dev) = mean_and_std(retained);
        let iterations = run.iterations();
        Ok(Self {
            iterations,
            burn_in,
            mean,
            std_dev,
            min: retained.iter().copied().fold(f64::INFINITY, f64::min),
            max: retained.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            acceptance_rate: run.acceptance_rate(),
            out_of_support_rate: run.out_of_support as f64 / iterations as f64,
        })
    }
}

/// Samples after burn-in, requiring at least one to remain.
pub fn retained_samples(samples: &[f64], burn_in: usize) -> Result<&[f64], SimError> {
    if burn_in >= samples.len() {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("nothing-retained", "burn-in discards every sample")
                .with_context("burn_in", burn_in)
                .with_context("samples", samples.len()),
        ));
    }
    Ok(&samples[burn_in..])
}

/// Bins `samples` according to `rule`.
pub fn histogram(samples: &[f64], rule: BinRule) -> Result<Histogram, SimError> {
    if samples.is_empty() {
        return Err(SimError::invalid_argument(
            "empty-samples",
            "cannot histogram an empty sample",
        ));
    }
    if let Some(index) = samples.iter().position(|value| !value.is_finite()) {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("samples-not-finite", "samples must be finite")
                .with_context("index", index),
        ));
    }
    let mut lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let bins = match rule {
        BinRule::Fixed { bins: 0 } => {
            return Err(SimError::invalid_argument("zero-bins", "bin count must be positive"))
        }
        BinRule::Fixed { bins } if bins > MAX_HISTOGRAM_BINS => {
            return Err(SimError::InvalidArgument(
                ErrorInfo::new("too-many-bins", "bin count exceeds the limit")
                    .with_context("bins", bins)
                    .with_context("max", MAX_HISTOGRAM_BINS),
            ))
        }
        BinRule::Fixed { bins } => bins,
        BinRule::Auto => auto_bin_count(samples, hi - lo),
    };

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|index| lo + index as f64 * width).collect();
    let mut counts = vec![0usize; bins];
    for &value in samples {
        let index = (((value - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    let total = samples.len() as f64;
    let density = counts
        .iter()
        .map(|&count| count as f64 / (total * width))
        .collect();
    Ok(Histogram {
        edges,
        counts,
        density,
    })
}

fn auto_bin_count(samples: &[f64], range: f64) -> usize {
    let n = samples.len() as f64;
    let sturges = range / (n.log2() + 1.0);
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
    ((range / width).ceil() as usize).clamp(1, samples.len().max(1))
}

/// Linear-interpolated percentile of sorted data, `q` in `[0, 1]`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn mean_and_std(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
