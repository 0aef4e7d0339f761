// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - Single-Trial Yield Model
//
// One trial = one perturbed annualized return per pool, blended by each
// pool's share of capital. Every draw comes from the injected source.

use crate::config::NoiseModel;
use crate::error::InvalidInputError;
use crate::random::RandomSource;
use crate::types::{AllocationVector, MarketConditions, Pool};

/// Simulate one blended annualized return. Can be negative.
pub fn simulate_one_trial<R: RandomSource + ?Sized>(
    allocation: &AllocationVector,
    pools: &[Pool],
    conditions: MarketConditions,
    noise: NoiseModel,
    rng: &mut R,
) -> Result<f64, InvalidInputError> {
    check_shape(allocation, pools)?;
    Ok(blend(allocation, pools, conditions.volatility, noise, rng))
}

pub(crate) fn check_shape(allocation: &AllocationVector, pools: &[Pool]) -> Result<(), InvalidInputError> {
    if allocation.len() != pools.len() {
        return Err(InvalidInputError::LengthMismatch {
            allocation: allocation.len(),
            pools: pools.len(),
        });
    }
    Ok(())
}

/// Unchecked trial body; shapes must already match.
pub(crate) fn blend<R: RandomSource + ?Sized>(
    allocation: &AllocationVector,
    pools: &[Pool],
    volatility: f64,
    noise: NoiseModel,
    rng: &mut R,
) -> f64 {
    let capital = allocation.capital();
    allocation.iter()
        .zip(pools)
        .map(|(amount, pool)| {
            // one draw per pool, empty positions included
            let perturbation = volatility * draw(noise, rng);
            let pool_return = pool.base_apy * (1.0 + perturbation);
            amount / capital * pool_return
        })
        .sum()
}

fn draw<R: RandomSource + ?Sized>(noise: NoiseModel, rng: &mut R) -> f64 {
    match noise {
        NoiseModel::Normal => rng.next_standard_normal(),
        NoiseModel::Uniform => rng.next_symmetric(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ChaChaFactory, RngFactory};

    /// Replays a fixed list of draws.
    struct Scripted {
        draws: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(draws: Vec<f64>) -> Self {
            Self { draws, next: 0 }
        }

        fn pop(&mut self) -> f64 {
            let v = self.draws[self.next % self.draws.len()];
            self.next += 1;
            v
        }
    }

    impl RandomSource for Scripted {
        fn next_uniform(&mut self) -> f64 { self.pop() }
        fn next_standard_normal(&mut self) -> f64 { self.pop() }
    }

    fn pools() -> Vec<Pool> {
        vec![Pool::new("RLUSD/XRP", 0.35).stable(), Pool::new("Solar/XRP", 0.30).eco()]
    }

    fn alloc() -> AllocationVector {
        AllocationVector::from_parts(10_000.0, vec![8_000.0, 2_000.0])
    }

    #[test]
    fn zero_noise_returns_weighted_base_apy() {
        let mut rng = Scripted::new(vec![0.0]);
        let y = simulate_one_trial(&alloc(), &pools(), MarketConditions::new(0.9, 0.5), NoiseModel::Normal, &mut rng)
            .expect("test: trial");
        assert!((y - 0.34).abs() < 1e-12);
    }

    #[test]
    fn perturbation_scales_with_volatility() {
        // z = +1 for pool 0, -1 for pool 1 at volatility 0.5
        let mut rng = Scripted::new(vec![1.0, -1.0]);
        let y = simulate_one_trial(&alloc(), &pools(), MarketConditions::new(0.5, 0.5), NoiseModel::Normal, &mut rng)
            .expect("test: trial");
        let expected = 0.8 * 0.35 * 1.5 + 0.2 * 0.30 * 0.5;
        assert!((y - expected).abs() < 1e-12);
    }

    #[test]
    fn uniform_noise_maps_draw_to_symmetric_interval() {
        // next_uniform = 1.0 maps to +1, 0.0 maps to -1
        let mut rng = Scripted::new(vec![1.0, 0.0]);
        let y = simulate_one_trial(&alloc(), &pools(), MarketConditions::new(1.0, 0.5), NoiseModel::Uniform, &mut rng)
            .expect("test: trial");
        let expected = 0.8 * 0.35 * 2.0;
        assert!((y - expected).abs() < 1e-12);
    }

    #[test]
    fn large_shocks_can_go_negative() {
        let mut rng = Scripted::new(vec![-3.0]);
        let y = simulate_one_trial(&alloc(), &pools(), MarketConditions::new(1.0, 0.5), NoiseModel::Normal, &mut rng)
            .expect("test: trial");
        assert!(y < 0.0);
    }

    #[test]
    fn identical_seeds_are_bit_identical() {
        let factory = ChaChaFactory::new(1234);
        let c = MarketConditions::new(0.96, 0.7);
        let a = simulate_one_trial(&alloc(), &pools(), c, NoiseModel::Normal, &mut factory.stream(9))
            .expect("test: trial a");
        let b = simulate_one_trial(&alloc(), &pools(), c, NoiseModel::Normal, &mut factory.stream(9))
            .expect("test: trial b");
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let short = AllocationVector::from_parts(100.0, vec![100.0]);
        let err = simulate_one_trial(&short, &pools(), MarketConditions::default(), NoiseModel::Normal, &mut Scripted::new(vec![0.0]))
            .expect_err("test: mismatch");
        assert_eq!(err, InvalidInputError::LengthMismatch { allocation: 1, pools: 2 });
    }
}
