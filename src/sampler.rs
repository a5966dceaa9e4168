//! Context samplers.
//!
//! The environment does not know how contexts are generated. It calls two
//! caller-supplied samplers, one for the global feature vector and one for a
//! single item's feature vector, and only insists that every sample has the
//! same length as the first one.
//!
//! Any `FnMut() -> Vec<f64>` closure is a sampler. [`UniformSampler`] and
//! [`NormalSampler`] are seedable stock samplers for benchmarks and tests.

use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::error::{RankingError, Result};

/// Source of feature vectors.
pub trait ContextSampler {
    /// Draw one feature vector.
    fn sample(&mut self) -> Vec<f64>;
}

impl<F> ContextSampler for F
where
    F: FnMut() -> Vec<f64>,
{
    fn sample(&mut self) -> Vec<f64> {
        self()
    }
}

/// Independent `Uniform[low, high)` features.
#[derive(Debug, Clone)]
pub struct UniformSampler {
    dim: usize,
    dist: Uniform<f64>,
    rng: StdRng,
}

impl UniformSampler {
    pub fn new(dim: usize, low: f64, high: f64, seed: u64) -> Result<Self> {
        let dist = Uniform::new(low, high)
            .map_err(|e| RankingError::Distribution(format!("uniform[{low}, {high}): {e}")))?;
        Ok(Self {
            dim,
            dist,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl ContextSampler for UniformSampler {
    fn sample(&mut self) -> Vec<f64> {
        (0..self.dim).map(|_| self.rng.sample(&self.dist)).collect()
    }
}

/// Independent `Normal(mean, std_dev)` features.
#[derive(Debug, Clone)]
pub struct NormalSampler {
    dim: usize,
    dist: Normal<f64>,
    rng: StdRng,
}

impl NormalSampler {
    /// `std_dev` must be finite and non-negative.
    pub fn new(dim: usize, mean: f64, std_dev: f64, seed: u64) -> Result<Self> {
        // `Normal::new` accepts a negative standard deviation (it mirrors the draws).
        if !(std_dev >= 0.0) {
            return Err(RankingError::Distribution(format!(
                "normal({mean}, {std_dev}): standard deviation must be >= 0"
            )));
        }
        let dist = Normal::new(mean, std_dev)
            .map_err(|e| RankingError::Distribution(format!("normal({mean}, {std_dev}): {e}")))?;
        Ok(Self {
            dim,
            dist,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl ContextSampler for NormalSampler {
    fn sample(&mut self) -> Vec<f64> {
        (0..self.dim).map(|_| self.rng.sample(&self.dist)).collect()
    }
}
