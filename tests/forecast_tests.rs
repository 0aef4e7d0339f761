#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal::Decimal;
    use yield_forecast::ledger::{to_ledger_amounts, XRP_SCALE};
    use yield_forecast::stats::YieldAccumulator;
    use yield_forecast::*;

    fn stress_pair() -> Vec<Pool> {
        vec![
            Pool::new("RLUSD/XRP", 0.35).stable(),
            Pool::new("Solar/XRP", 0.30).eco(),
        ]
    }

    fn presets() -> Vec<Pool> {
        PoolRegistry::xrpl_defaults().into()
    }

    fn stable_amount(allocation: &AllocationVector, pools: &[Pool]) -> f64 {
        allocation.amount_where(pools, |p| p.is_stable)
    }

    // ========== Allocation ==========

    #[test]
    fn allocation_sums_to_capital() {
        let cfg = AllocatorConfig::default();
        for &capital in &[0.01, 1.0, 10_000.0, 123_456.789, 1e12] {
            for &vol in &[0.0, 0.3, 0.5, 0.51, 0.96, 1.0] {
                let a = allocate(capital, &presets(), MarketConditions::new(vol, 0.5), &cfg)
                    .expect("valid inputs allocate");
                let err = (a.total() - capital).abs();
                assert!(err <= capital * 1e-9, "capital {} vol {}: off by {}", capital, vol, err);
                assert!(a.iter().all(|&x| x >= 0.0 && x.is_finite()));
            }
        }
    }

    #[test]
    fn high_volatility_shifts_capital_to_stable_pools() {
        let cfg = AllocatorConfig::default();
        let pools = presets();
        let calm = allocate(100_000.0, &pools, MarketConditions::new(0.49, 0.5), &cfg).expect("allocates");
        let stressed = allocate(100_000.0, &pools, MarketConditions::new(0.51, 0.5), &cfg).expect("allocates");

        assert!(stable_amount(&stressed, &pools) >= 50_000.0);
        assert!(stable_amount(&stressed, &pools) > stable_amount(&calm, &pools));
        assert!((stable_amount(&stressed, &pools) - 80_000.0).abs() < 1e-6);
    }

    #[test]
    fn exactly_at_threshold_is_calm() {
        let cfg = AllocatorConfig::default();
        let d = allocate_with_regime(1_000.0, &stress_pair(), MarketConditions::new(0.5, 0.5), &cfg)
            .expect("allocates");
        assert_eq!(d.regime, AllocationRegime::Calm);
    }

    #[test]
    fn eco_boost_never_reduces_eco_share() {
        let pools = vec![
            Pool::new("Solar/XRP", 0.30).eco(),
            Pool::new("SOLO/XRP", 0.55),
            Pool::new("RLUSD/XRP", 0.35).stable(),
        ];
        let conditions = MarketConditions::new(0.2, 0.5);
        let mut last = 0.0;
        for boost in [1.0, 1.1, 1.24, 1.5, 2.0, 4.0] {
            let cfg = AllocatorConfig { eco_boost: boost, ..Default::default() };
            let a = allocate(10_000.0, &pools, conditions, &cfg).expect("allocates");
            let eco = a.amount_where(&pools, |p| p.is_eco);
            assert!(eco >= last - 1e-9, "boost {} dropped eco amount {} -> {}", boost, last, eco);
            last = eco;
        }
    }

    #[test]
    fn no_stable_pools_falls_back_to_even_split() {
        let pools = vec![Pool::new("A", 0.3).eco(), Pool::new("B", 0.4), Pool::new("C", 0.5)];
        let d = allocate_with_regime(
            900.0,
            &pools,
            MarketConditions::new(0.9, 0.5),
            &AllocatorConfig::default(),
        )
        .expect("allocates");
        assert_eq!(d.regime, AllocationRegime::EvenFallback);
        for &x in d.allocation.iter() {
            assert!((x - 300.0).abs() < 1e-9);
        }
    }

    // ========== Trials ==========

    #[test]
    fn same_seed_same_trial() {
        let pools = stress_pair();
        let conditions = MarketConditions::new(0.96, 0.7);
        let a = allocate(10_000.0, &pools, conditions, &AllocatorConfig::default()).expect("allocates");

        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            simulate_one_trial(&a, &pools, conditions, NoiseModel::Normal, &mut rng).expect("trial runs")
        };
        assert_eq!(draw(5).to_bits(), draw(5).to_bits());
        assert_ne!(draw(5).to_bits(), draw(6).to_bits());
    }

    // ========== Monte Carlo ==========

    #[test]
    fn concrete_stress_scenario() {
        let pools = stress_pair();
        let config = SimulationConfig::default().with_trials(1000).with_seed(42);
        let result = run_seeded(10_000.0, &pools, MarketConditions::new(0.96, 0.7), &config)
            .expect("simulation runs");

        let amounts = result.decision.allocation.amounts();
        assert!((amounts[0] - 8_000.0).abs() < 1e-6);
        assert!((amounts[1] - 2_000.0).abs() < 1e-6);
        assert_eq!(result.decision.regime, AllocationRegime::StableShift);

        let s = result.summary;
        assert_eq!(s.trial_count, 1000);
        assert!((s.expected_yield - 0.34).abs() < 1e-12);
        assert!((s.mean_yield - 0.34).abs() < 0.04, "mean {}", s.mean_yield);
    }

    #[test]
    fn summary_sanity_across_regimes() {
        let pools = presets();
        for (vol, regime) in [
            (0.0, ConditionRegime::Fixed),
            (0.3, ConditionRegime::Fixed),
            (0.96, ConditionRegime::Fixed),
            (0.5, ConditionRegime::Resample { spread: 0.4 }),
        ] {
            let config = SimulationConfig::default().with_trials(400).with_regime(regime);
            let s = run_simulation(
                50_000.0,
                &pools,
                MarketConditions::new(vol, 0.5),
                &config,
                &ChaChaFactory::new(3),
            )
            .expect("simulation runs");
            assert!(s.min_yield <= s.mean_yield && s.mean_yield <= s.max_yield);
            assert!(s.percentile_5 <= s.percentile_95);
            assert!(s.std_dev >= 0.0);
            assert!((0.0..=1.0).contains(&s.success_rate));
            assert!(s.sharpe_ratio.is_finite());
        }
    }

    #[test]
    fn zero_volatility_is_deterministic_yield() {
        let config = SimulationConfig::default().with_trials(50);
        let s = run_simulation(
            10_000.0,
            &stress_pair(),
            MarketConditions::new(0.0, 0.5),
            &config,
            &ChaChaFactory::new(1),
        )
        .expect("simulation runs");
        assert_eq!(s.std_dev, 0.0);
        assert!(!s.sharpe_defined);
        assert_eq!(s.sharpe_ratio, 0.0);
        assert_eq!(s.min_yield, s.max_yield);
    }

    #[test]
    fn serial_and_parallel_agree() {
        let pools = presets();
        let conditions = MarketConditions::new(0.7, 0.4);
        let serial = SimulationConfig::default().with_trials(2_000).with_seed(11);
        let parallel = serial.clone().with_execution(ExecutionStrategy::Parallel);
        let a = run_seeded(1_000.0, &pools, conditions, &serial).expect("serial runs");
        let b = run_seeded(1_000.0, &pools, conditions, &parallel).expect("parallel runs");
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn accumulator_merge_matches_batch() {
        let pools = stress_pair();
        let conditions = MarketConditions::new(0.8, 0.5);
        let a = allocate(1.0, &pools, conditions, &AllocatorConfig::default()).expect("allocates");
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let yields: Vec<f64> = (0..1_000)
            .map(|_| simulate_one_trial(&a, &pools, conditions, NoiseModel::Uniform, &mut rng).expect("trial"))
            .collect();

        let batch: YieldAccumulator = yields.iter().copied().collect();
        let (left, right) = yields.split_at(377);
        let merged = left
            .iter()
            .copied()
            .collect::<YieldAccumulator>()
            .merge(right.iter().copied().collect());

        assert_eq!(merged.count(), batch.count());
        assert!((merged.mean() - batch.mean()).abs() < 1e-12);
        assert!((merged.std_dev() - batch.std_dev()).abs() < 1e-12);
        assert_eq!(merged.min(), batch.min());
        assert_eq!(merged.max(), batch.max());
    }

    // ========== Polling & ledger ==========

    #[test]
    fn poller_tracks_market_changes() {
        let mut poller = ForecastPoller::new(
            10_000.0,
            stress_pair(),
            SimulationConfig::default().with_trials(100),
            FixedMarket::new(MarketConditions::new(0.2, 0.5)),
        )
        .expect("poller builds");

        let calm = poller.poll().expect("poll");
        poller.market_mut().set(MarketConditions::new(0.96, 0.5));
        let stressed = poller.poll().expect("poll");

        assert!(!calm.stable_shift_active);
        assert!(stressed.stable_shift_active);
        assert_eq!(stressed.seed, calm.seed + 1);
        assert!((stressed.allocation[0] - 8_000.0).abs() < 1e-6);
    }

    #[test]
    fn ledger_amounts_sum_exactly() {
        let pools = presets();
        let a = allocate(1_000.0, &pools, MarketConditions::new(0.3, 0.5), &AllocatorConfig::default())
            .expect("allocates");
        let amounts = to_ledger_amounts(&a, &pools, XRP_SCALE).expect("converts");
        let total: Decimal = amounts.iter().map(|p| p.amount).sum();
        assert_eq!(total, Decimal::new(1_000, 0));
        assert!(amounts.iter().all(|p| p.amount.scale() <= XRP_SCALE));
    }

    // ========== Invalid input ==========

    #[test]
    fn rejects_bad_capital() {
        let cfg = AllocatorConfig::default();
        let c = MarketConditions::default();
        for capital in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                allocate(capital, &stress_pair(), c, &cfg),
                Err(InvalidInputError::NonPositiveCapital(_))
            ));
        }
    }

    #[test]
    fn rejects_bad_pools() {
        let cfg = AllocatorConfig::default();
        let c = MarketConditions::default();
        assert_eq!(allocate(100.0, &[], c, &cfg), Err(InvalidInputError::EmptyPools));
        assert!(matches!(
            allocate(100.0, &[Pool::new("A", -0.1)], c, &cfg),
            Err(InvalidInputError::InvalidBaseApy { .. })
        ));
        assert!(matches!(
            allocate(100.0, &[Pool::new("A", 0.1), Pool::new("A", 0.2)], c, &cfg),
            Err(InvalidInputError::DuplicatePoolName(_))
        ));
    }

    #[test]
    fn strict_policy_rejects_out_of_range_conditions() {
        let cfg = AllocatorConfig { condition_policy: ConditionPolicy::Strict, ..Default::default() };
        assert!(matches!(
            allocate(100.0, &stress_pair(), MarketConditions::new(1.5, 0.5), &cfg),
            Err(InvalidInputError::ConditionOutOfRange { field: "volatility", .. })
        ));
    }

    #[test]
    fn rejects_zero_trials() {
        let config = SimulationConfig::default().with_trials(0);
        assert_eq!(
            run_seeded(100.0, &stress_pair(), MarketConditions::default(), &config).map(|f| f.summary),
            Err(InvalidInputError::NoTrials)
        );
    }

    #[test]
    fn mismatched_allocation_rejected_by_trial() {
        let a = allocate(100.0, &stress_pair(), MarketConditions::default(), &AllocatorConfig::default())
            .expect("allocates");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            simulate_one_trial(&a, &presets(), MarketConditions::default(), NoiseModel::Normal, &mut rng),
            Err(InvalidInputError::LengthMismatch { .. })
        ));
    }
}
