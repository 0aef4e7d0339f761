// Multi-Seed Runner — N forecasts per scenario with cross-run aggregation
// Run i uses seed base+i; every run re-allocates and re-simulates from scratch.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use yield_forecast::ledger::{to_ledger_amounts, XRP_SCALE};
use yield_forecast::*;

use crate::feed::RandomWalkFeed;
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::path::Path;
use std::time::Instant;

/// Per-read volatility/sentiment move of the poll-mode feed.
const FEED_STEP: f64 = 0.05;

fn scenario_config(scenario: &Scenario, base: &SimulationConfig, seed: u64) -> SimulationConfig {
    let config = base.clone().with_seed(seed);
    match scenario.regime {
        Some(regime) => config.with_regime(regime),
        None => config,
    }
}

/// Run a single forecast of a scenario with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    config: &SimulationConfig,
    seed: u64,
) -> Result<RunResult, InvalidInputError> {
    let start = Instant::now();
    let config = scenario_config(scenario, config, seed);
    let forecast = run_seeded(scenario.capital, &scenario.pools, scenario.conditions, &config)?;
    let elapsed_ms = start.elapsed().as_millis();

    let allocation = &forecast.decision.allocation;
    let capital = allocation.capital();
    let stable_share = allocation.amount_where(&scenario.pools, |p| p.is_stable) / capital;
    let eco_share = allocation.amount_where(&scenario.pools, |p| p.is_eco) / capital;
    let summary = forecast.summary;

    // Evaluate pass/fail
    let criteria = &scenario.criteria;
    let mut failures = Vec::new();
    let (lo, hi) = criteria.mean_band;
    if summary.mean_yield < lo || summary.mean_yield > hi {
        failures.push(format!("mean yield {:.4} outside [{}, {}]", summary.mean_yield, lo, hi));
    }
    if let Some(min) = criteria.min_success_rate {
        if summary.success_rate < min {
            failures.push(format!("success rate {:.3} < {}", summary.success_rate, min));
        }
    }
    if let Some(min) = criteria.min_stable_share {
        if stable_share < min {
            failures.push(format!("stable share {:.3} < {}", stable_share, min));
        }
    }
    if let Some(max) = criteria.max_stable_share {
        if stable_share > max + 1e-9 {
            failures.push(format!("stable share {:.3} > {}", stable_share, max));
        }
    }

    Ok(RunResult {
        seed,
        pass: failures.is_empty(),
        failures,
        stable_shift_active: forecast.decision.regime == AllocationRegime::StableShift,
        stable_share,
        eco_share,
        summary,
        elapsed_ms,
    })
}

/// Run N seeds of a scenario and aggregate.
pub fn run_scenario(
    scenario: &Scenario,
    config: &SimulationConfig,
    n_runs: usize,
    base_seed: u64,
) -> Result<ScenarioReport, InvalidInputError> {
    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed.wrapping_add(i as u64);
        results.push(run_single(scenario, config, seed)?);
    }

    // The allocation itself is seed-independent.
    let allocation = allocate(scenario.capital, &scenario.pools, scenario.conditions, &config.allocator)?;
    let ledger = to_ledger_amounts(&allocation, &scenario.pools, XRP_SCALE)?;

    let report = aggregate(scenario, ledger, results);
    info!(
        scenario = scenario.name,
        runs = report.n_runs,
        pass_rate = report.pass_rate,
        mean_yield = report.mean_yield.mean,
        "scenario complete"
    );
    Ok(report)
}

/// Aggregate individual runs into a ScenarioReport.
fn aggregate(
    scenario: &Scenario,
    allocation: Vec<yield_forecast::ledger::PoolAmount>,
    results: Vec<RunResult>,
) -> ScenarioReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n == 0 { 0.0 } else { passed as f64 / n as f64 };

    let metric = |f: fn(&RunResult) -> f64| {
        Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
    };

    ScenarioReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        capital: scenario.capital,
        conditions: scenario.conditions,
        n_runs: n,
        pass_rate,
        allocation,
        mean_yield: metric(|r| r.summary.mean_yield),
        std_dev: metric(|r| r.summary.std_dev),
        sharpe_ratio: metric(|r| r.summary.sharpe_ratio),
        success_rate: metric(|r| r.summary.success_rate),
        percentile_5: metric(|r| r.summary.percentile_5),
        percentile_95: metric(|r| r.summary.percentile_95),
        elapsed_ms: metric(|r| r.elapsed_ms as f64),
        individual_runs: results,
    }
}

/// Poll a scenario against a seeded random-walk feed.
pub fn run_polls(
    scenario: &Scenario,
    config: &SimulationConfig,
    polls: u64,
    base_seed: u64,
    time_series_dir: Option<&Path>,
) -> Result<Vec<ForecastSnapshot>, InvalidInputError> {
    let config = scenario_config(scenario, config, base_seed);
    let feed = RandomWalkFeed::new(
        ChaCha8Rng::seed_from_u64(base_seed),
        scenario.conditions.volatility,
        scenario.conditions.sentiment,
        FEED_STEP,
    )
    .with_curve(scenario.volatility_curve);

    let poller = ForecastPoller::new(scenario.capital, scenario.pools.clone(), config, feed)?;
    let snapshots = poller.take(polls as usize).collect::<Result<Vec<_>, _>>()?;

    if let Some(dir) = time_series_dir {
        let mut recorder = TimeSeriesRecorder::new();
        for snapshot in &snapshots {
            recorder.record(snapshot);
        }
        let path = dir
            .join(scenario.name.to_lowercase())
            .join(format!("seed-{}.jsonl", base_seed));
        if let Err(e) = recorder.write_jsonl(&path) {
            warn!(path = %path.display(), error = %e, "failed to write time series");
        }
    }
    Ok(snapshots)
}
