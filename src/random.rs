// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - Random Sources
//
// Trials never touch a global generator. Each trial pulls from a source the
// caller injects, and the Monte Carlo driver asks a factory for one
// independently seeded stream per trial.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Source of the random draws a trial consumes.
pub trait RandomSource {
    /// Uniform in [0, 1).
    fn next_uniform(&mut self) -> f64;

    fn next_standard_normal(&mut self) -> f64;

    /// Uniform in [-1, 1).
    fn next_symmetric(&mut self) -> f64 {
        2.0 * self.next_uniform() - 1.0
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn next_standard_normal(&mut self) -> f64 {
        self.sample::<f64, _>(StandardNormal)
    }
}

/// Produces one independent source per trial index.
pub trait RngFactory: Sync {
    type Source: RandomSource;

    fn stream(&self, index: u64) -> Self::Source;
}

/// ChaCha8 streams sharing one seed, separated by stream id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaChaFactory {
    seed: u64,
}

impl ChaChaFactory {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 { self.seed }
}

impl RngFactory for ChaChaFactory {
    type Source = ChaCha8Rng;

    fn stream(&self, index: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(index);
        rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_stream_is_reproducible() {
        let factory = ChaChaFactory::new(7);
        let a: Vec<f64> = {
            let mut s = factory.stream(3);
            (0..5).map(|_| s.next_uniform()).collect()
        };
        let b: Vec<f64> = {
            let mut s = factory.stream(3);
            (0..5).map(|_| s.next_uniform()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn streams_diverge() {
        let factory = ChaChaFactory::new(7);
        let mut s0 = factory.stream(0);
        let mut s1 = factory.stream(1);
        assert_ne!(s0.next_uniform(), s1.next_uniform());
    }

    #[test]
    fn uniform_and_symmetric_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..10_000 {
            let u = rng.next_uniform();
            assert!((0.0..1.0).contains(&u));
            let s = rng.next_symmetric();
            assert!((-1.0..1.0).contains(&s));
        }
    }

    #[test]
    fn standard_normal_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.next_standard_normal()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "normal mean {} far from 0", mean);
        assert!((var - 1.0).abs() < 0.05, "normal variance {} far from 1", var);
    }
}
