use ksim_core::errors::{ErrorInfo, SimError};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::posterior::{log_unnormalized_posterior, sum_of_squares};

/// Outcome of a single Metropolis-Hastings proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The candidate replaced the current value.
    Accepted,
    /// The candidate failed the Metropolis test.
    Rejected,
    /// The candidate fell at or below 1, where the prior vanishes.
    OutOfSupport,
}

/// Samples and acceptance counters of one completed chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRun {
    /// Chain position after every iteration, accepted or not.
    pub samples: Vec<f64>,
    /// Proposals accepted.
    pub accepted: usize,
    /// Proposals inside the support that failed the Metropolis test.
    pub rejected: usize,
    /// Proposals rejected outright for falling at or below 1.
    pub out_of_support: usize,
}

impl ChainRun {
    /// Number of iterations the chain ran for.
    pub fn iterations(&self) -> usize {
        self.samples.len()
    }

    /// Fraction of proposals accepted, or 0 for an empty chain.
    pub fn acceptance_rate(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.accepted as f64 / self.samples.len() as f64
        }
    }
}

/// Random-walk Metropolis-Hastings sampler for the posterior over `a`.
///
/// Only the sufficient statistics of the data are kept, so one sampler can
/// drive any number of independent chains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetropolisHastings {
    sum_of_squares: f64,
    sample_count: usize,
}

impl MetropolisHastings {
    /// Builds a sampler for the given data points.
    pub fn new(data: &[f64]) -> Result<Self, SimError> {
        Ok(Self {
            sum_of_squares: sum_of_squares(data)?,
            sample_count: data.len(),
        })
    }

    /// Builds a sampler directly from `sum x_i^2` and `n`.
    pub fn from_statistics(sum_of_squares: f64, sample_count: usize) -> Result<Self, SimError> {
        if !(sum_of_squares.is_finite() && sum_of_squares >= 0.0) {
            return Err(SimError::InvalidArgument(
                ErrorInfo::new("sum-of-squares-invalid", "sum of squares must be finite and >= 0")
                    .with_context("sum_of_squares", sum_of_squares),
            ));
        }
        Ok(Self {
            sum_of_squares,
            sample_count,
        })
    }

    /// Sum of squared data points.
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Number of data points.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Log of the unnormalized posterior at `a`.
    pub fn log_density(&self, a: f64) -> Result<f64, SimError> {
        log_unnormalized_posterior(a, self.sum_of_squares, self.sample_count)
    }

    /// Runs a chain of `iterations` steps starting from `initial_value`.
    ///
    /// Each step proposes `current + N(0, 1)`. Candidates at or below 1 are
    /// rejected without a draw; otherwise the candidate is accepted when the
    /// posterior ratio is at least 1, or with probability equal to the ratio.
    /// The current value is recorded after every step. `initial_value` must
    /// lie inside the support (`> 1`).
    pub fn run<R: Rng + ?Sized>(
        &self,
        iterations: usize,
        initial_value: f64,
        rng: &mut R,
    ) -> Result<ChainRun, SimError> {
        if !(initial_value > 1.0 && initial_value.is_finite()) {
            return Err(SimError::InvalidArgument(
                ErrorInfo::new(
                    "initial-value-outside-support",
                    "chain must start at a finite value greater than 1",
                )
                .with_context("initial_value", initial_value),
            ));
        }

        let mut current = initial_value;
        let mut current_log = self.log_density(current)?;
        let mut run = ChainRun {
            samples: Vec::with_capacity(iterations),
            accepted: 0,
            rejected: 0,
            out_of_support: 0,
        };

        for _ in 0..iterations {
            let step: f64 = rng.sample(StandardNormal);
            let candidate = current + step;
            match self.evaluate(candidate, current_log, rng)? {
                (StepOutcome::Accepted, Some(candidate_log)) => {
                    current = candidate;
                    current_log = candidate_log;
                    run.accepted += 1;
                }
                (StepOutcome::OutOfSupport, _) => run.out_of_support += 1,
                _ => run.rejected += 1,
            }
            run.samples.push(current);
        }

        debug!(
            iterations,
            accepted = run.accepted,
            out_of_support = run.out_of_support,
            acceptance_rate = run.acceptance_rate(),
            "chain finished"
        );
        Ok(run)
    }

    fn evaluate<R: Rng + ?Sized>(
        &self,
        candidate: f64,
        current_log: f64,
        rng: &mut R,
    ) -> Result<(StepOutcome, Option<f64>), SimError> {
        if candidate <= 1.0 {
            return Ok((StepOutcome::OutOfSupport, None));
        }
        let candidate_log = self.log_density(candidate)?;
        let ratio = (candidate_log - current_log).exp();
        if ratio >= 1.0 {
            return Ok((StepOutcome::Accepted, Some(candidate_log)));
        }
        let draw: f64 = rng.gen();
        if draw < ratio {
            Ok((StepOutcome::Accepted, Some(candidate_log)))
        } else {
            Ok((StepOutcome::Rejected, None))
        }
    }
}

/// Runs a Metropolis-Hastings chain over `a` for `data` and returns its samples.
pub fn run_chain<R: Rng + ?Sized>(
    iterations: usize,
    initial_value: f64,
    data: &[f64],
    rng: &mut R,
) -> Result<Vec<f64>, SimError> {
    MetropolisHastings::new(data)?
        .run(iterations, initial_value, rng)
        .map(|run| run.samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksim_core::RngHandle;

    #[test]
    fn out_of_support_candidates_never_consume_a_uniform_draw() {
        let sampler = MetropolisHastings::from_statistics(100.0, 100).unwrap();
        let mut rng = RngHandle::from_seed(3);
        let (outcome, log) = sampler.evaluate(0.9, 0.0, &mut rng).unwrap();
        assert_eq!(outcome, StepOutcome::OutOfSupport);
        assert!(log.is_none());
    }

    #[test]
    fn uphill_moves_are_always_accepted() {
        let sampler = MetropolisHastings::from_statistics(100.0, 100).unwrap();
        let mut rng = RngHandle::from_seed(3);
        let low = sampler.log_density(10.0).unwrap();
        let (outcome, _) = sampler.evaluate(3.0, low, &mut rng).unwrap();
        assert_eq!(outcome, StepOutcome::Accepted);
    }

    #[test]
    fn counters_add_up() {
        let sampler = MetropolisHastings::from_statistics(95.0, 100).unwrap();
        let mut rng = RngHandle::from_seed(21);
        let run = sampler.run(2_000, 10.0, &mut rng).unwrap();
        assert_eq!(run.accepted + run.rejected + run.out_of_support, 2_000);
        assert_eq!(run.iterations(), 2_000);
    }
}
