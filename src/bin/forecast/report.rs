// Forecast Report Types
// Structured output for downstream dashboards and archival

use serde::Serialize;
use yield_forecast::ledger::PoolAmount;
use yield_forecast::stats::{percentile_sorted, YieldAccumulator};
use yield_forecast::{MarketConditions, SimulationSummary};

// ─── Statistics (cross-run aggregation) ─────────────────────────────────────

/// Spread of one metric across independent seeds: sample std dev, 95% CI
/// on the mean, median.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.96;

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let acc: YieldAccumulator = samples.iter().copied().collect();
        let n = samples.len();
        if n == 0 {
            return Self {
                mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0,
                median: 0.0, min: 0.0, max: 0.0, n: 0,
            };
        }
        // Bessel-corrected; the accumulator keeps the population figure.
        let std_dev = if n > 1 {
            (acc.variance() * n as f64 / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        let half = Z_95 * std_dev / (n as f64).sqrt();

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            mean: acc.mean(),
            std_dev,
            ci_lower: acc.mean() - half,
            ci_upper: acc.mean() + half,
            median: percentile_sorted(&sorted, 50.0),
            min: acc.min(),
            max: acc.max(),
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub seed: u64,
    pub pass: bool,
    pub failures: Vec<String>,
    pub stable_shift_active: bool,
    pub stable_share: f64,
    pub eco_share: f64,
    pub summary: SimulationSummary,
    pub elapsed_ms: u128,
}

// ─── Scenario Report (per-scenario aggregation) ─────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub capital: f64,
    pub conditions: MarketConditions,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub allocation: Vec<PoolAmount>,
    pub mean_yield: Stats,
    pub std_dev: Stats,
    pub sharpe_ratio: Stats,
    pub success_rate: Stats,
    pub percentile_5: Stats,
    pub percentile_95: Stats,
    pub elapsed_ms: Stats,
    pub individual_runs: Vec<RunResult>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.pass_rate >= 1.0
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub trials_per_run: usize,
    pub runs_per_scenario: usize,
    pub summary: Summary,
    pub scenarios: Vec<ScenarioReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
