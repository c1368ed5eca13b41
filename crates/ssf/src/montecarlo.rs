//! Parallel Monte-Carlo replication of a [`RandomGenerator`].

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::SsfError;
use crate::generator::{RandomGenerator, SimulatedPath};
use crate::random::SharedNormalSource;

/// Realisations and per-period moments of a Monte-Carlo run.
#[derive(Clone, Debug, Serialize)]
pub struct MonteCarloSummary {
    n: usize,
    n_sim: usize,
    seed: u64,
    mean: Vec<f64>,
    variance: Vec<f64>,
    #[serde(skip)]
    paths: Vec<SimulatedPath>,
}

impl MonteCarloSummary {
    /// Periods per realisation.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of realisations.
    pub fn n_sim(&self) -> usize {
        self.n_sim
    }

    /// Base seed; realisation `i` is drawn with seed `seed + i`.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Mean across realisations, per period.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Unbiased variance across realisations, per period. Zero when there
    /// is a single realisation.
    pub fn variance(&self) -> &[f64] {
        &self.variance
    }

    /// The realisations, in seed order.
    pub fn paths(&self) -> &[SimulatedPath] {
        &self.paths
    }

    /// Consumes the summary and returns the realisations.
    pub fn into_paths(self) -> Vec<SimulatedPath> {
        self.paths
    }
}

/// Draws `n_sim` independent paths of length `n` in parallel.
///
/// Every realisation owns a [`SharedNormalSource`] seeded with
/// `seed + i`, so the output does not depend on thread scheduling.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`SsfError::InvalidLength`] | `n == 0` |
/// | [`SsfError::InvalidConfig`] | `n_sim == 0` |
#[tracing::instrument(skip(generator))]
pub fn monte_carlo(
    generator: &RandomGenerator,
    n: usize,
    n_sim: usize,
    seed: u64,
) -> Result<MonteCarloSummary, SsfError> {
    if n == 0 {
        return Err(SsfError::InvalidLength { n });
    }
    if n_sim == 0 {
        return Err(SsfError::InvalidConfig {
            reason: "n_sim must be at least 1".to_string(),
        });
    }

    let paths = (0..n_sim)
        .into_par_iter()
        .map(|i| {
            let source = SharedNormalSource::seeded(seed.wrapping_add(i as u64));
            generator.simulate_with(n, &source)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (mean, variance) = moments(&paths, n);
    info!(n, n_sim, "Monte-Carlo run complete");

    Ok(MonteCarloSummary {
        n,
        n_sim,
        seed,
        mean,
        variance,
        paths,
    })
}

fn moments(paths: &[SimulatedPath], n: usize) -> (Vec<f64>, Vec<f64>) {
    let k = paths.len() as f64;
    let mut mean = vec![0.0; n];
    for p in paths {
        mean.iter_mut().zip(p.data()).for_each(|(m, y)| *m += y);
    }
    mean.iter_mut().for_each(|m| *m /= k);

    let mut variance = vec![0.0; n];
    if paths.len() > 1 {
        for p in paths {
            for ((v, y), m) in variance.iter_mut().zip(p.data()).zip(&mean) {
                *v += (y - m).powi(2);
            }
        }
        variance.iter_mut().for_each(|v| *v /= k - 1.0);
    }
    (mean, variance)
}
