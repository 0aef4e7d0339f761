// Yield Forecast Runner v0.1.0 — multi-seed scenario validation and polling
// Seedable ChaCha8 streams, per-poll JSONL audit trail
//
// Usage:
//   cargo run --release --bin forecast                               # All built-in scenarios
//   cargo run --release --bin forecast -- --runs 5                   # Quick mode (5 seeds each)
//   cargo run --release --bin forecast -- STRESS                     # Filter by name
//   cargo run --release --bin forecast -- --capital 10000 --volatility 0.96 --pools pools.json
//   cargo run --release --bin forecast -- --polls 30 --time-series ts   # Poll mode with JSONL output

mod feed;
mod report;
mod runner;
mod scenarios;
mod time_series;

use clap::Parser;
use report::*;
use scenarios::*;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::error;
use tracing_subscriber::EnvFilter;
use yield_forecast::{ExecutionStrategy, MarketConditions, PoolRegistry, SimulationConfig};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "forecast", version, about = "Monte Carlo yield forecasts for volatility-conditioned pool allocations")]
struct Cli {
    /// Pool registry JSON (array of pools). Implies a custom scenario.
    #[arg(long)]
    pools: Option<PathBuf>,

    /// Restrict the pool registry to these names (comma-separated).
    /// Implies a custom scenario.
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Simulation config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capital to allocate. Implies a custom scenario.
    #[arg(long)]
    capital: Option<f64>,

    /// Market volatility in [0, 1]. Implies a custom scenario.
    #[arg(long)]
    volatility: Option<f64>,

    /// Market sentiment in [0, 1]. Implies a custom scenario.
    #[arg(long)]
    sentiment: Option<f64>,

    /// Trials per forecast (overrides the config file).
    #[arg(long)]
    trials: Option<usize>,

    /// Base seed; run i uses base + i.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Seeds per scenario (at least 1).
    #[arg(long, default_value_t = 30)]
    runs: usize,

    /// Spread trials over all cores.
    #[arg(long)]
    parallel: bool,

    /// Poll each scenario this many times against a random-walk feed.
    #[arg(long)]
    polls: Option<u64>,

    /// Write per-poll JSONL under this directory (poll mode).
    #[arg(long, value_name = "DIR")]
    time_series: Option<PathBuf>,

    /// Output directory for the JSON report.
    #[arg(long, default_value = "forecast-results")]
    out: PathBuf,

    /// Scenario filter (name, label or category substring).
    filter: Option<String>,
}

impl Cli {
    fn wants_custom(&self) -> bool {
        self.pools.is_some()
            || !self.only.is_empty()
            || self.capital.is_some()
            || self.volatility.is_some()
            || self.sentiment.is_some()
    }
}

fn load_config(cli: &Cli) -> Result<SimulationConfig, Box<dyn Error>> {
    if cli.runs == 0 {
        return Err("--runs must be at least 1".into());
    }
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(trials) = cli.trials {
        config = config.with_trials(trials);
    }
    if cli.parallel {
        config = config.with_execution(ExecutionStrategy::Parallel);
    }
    config.validate()?;
    Ok(config)
}

fn custom_scenario(cli: &Cli) -> Result<Scenario, Box<dyn Error>> {
    let registry = match &cli.pools {
        Some(path) => PoolRegistry::from_json_file(path)?,
        None => PoolRegistry::xrpl_defaults(),
    };
    let registry = if cli.only.is_empty() { registry } else { registry.subset(&cli.only)? };
    let defaults = MarketConditions::default();
    Ok(Scenario {
        name: "CUSTOM",
        label: "Custom: command-line inputs",
        category: "custom",
        capital: cli.capital.unwrap_or(10_000.0),
        pools: registry.into(),
        conditions: MarketConditions::new(
            cli.volatility.unwrap_or(defaults.volatility),
            cli.sentiment.unwrap_or(defaults.sentiment),
        ),
        regime: None,
        volatility_curve: None,
        criteria: PassCriteria::default(),
    })
}

fn select_scenarios(cli: &Cli) -> Result<Vec<Scenario>, Box<dyn Error>> {
    if cli.wants_custom() {
        return Ok(vec![custom_scenario(cli)?]);
    }
    let all = scenarios();
    let selected: Vec<Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all.into_iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all,
    };
    if selected.is_empty() {
        return Err(format!("no scenarios match filter: {:?}", cli.filter).into());
    }
    Ok(selected)
}

// ─── Poll Mode ──────────────────────────────────────────────────────────────

fn run_poll_mode(
    cli: &Cli,
    config: &SimulationConfig,
    to_run: &[Scenario],
    polls: u64,
) -> Result<bool, Box<dyn Error>> {
    let ts_dir = cli.time_series.as_deref();

    println!("  {:<6} {:>6} {:>7} {:>9} {:>9} {:>9} {:>8}",
        "Poll", "Vol", "Shift", "Mean", "P5", "P95", "Sharpe");
    for scenario in to_run {
        println!("  {}", scenario.label);
        println!("  {}", "-".repeat(64));
        let snapshots = runner::run_polls(scenario, config, polls, cli.seed, ts_dir)?;
        for s in &snapshots {
            println!("  {:<6} {:>6.3} {:>7} {:>8.2}% {:>8.2}% {:>8.2}% {:>8.2}",
                s.poll,
                s.conditions.volatility,
                if s.stable_shift_active { "yes" } else { "no" },
                s.summary.mean_yield * 100.0,
                s.summary.percentile_5 * 100.0,
                s.summary.percentile_95 * 100.0,
                s.summary.sharpe_ratio,
            );
        }
        println!();
    }
    if let Some(dir) = ts_dir {
        println!("  Time series saved under: {}\n", dir.display());
    }
    Ok(true)
}

// ─── Scenario Mode ──────────────────────────────────────────────────────────

fn run_scenario_mode(
    cli: &Cli,
    config: &SimulationConfig,
    to_run: Vec<Scenario>,
) -> Result<bool, Box<dyn Error>> {
    println!("  {:<40} {:>5} {:>14} {:>9} {:>9} {:>8} {:>7}",
        "Scenario", "Pass%", "Mean", "P5", "P95", "Success", "Time");
    println!("  {}", "-".repeat(98));

    let suite_start = Instant::now();
    let mut reports = Vec::with_capacity(to_run.len());

    for scenario in &to_run {
        let report = runner::run_scenario(scenario, config, cli.runs, cli.seed)?;
        let status = if report.passed() { "PASS" } else { "FAIL" };
        println!("  {:<40} {:>4}% {:>7.2}±{:<5.2} {:>8.2}% {:>8.2}% {:>7.1}% {:>5.0}ms  {}",
            report.label,
            (report.pass_rate * 100.0) as u32,
            report.mean_yield.mean * 100.0,
            report.mean_yield.half_width() * 100.0,
            report.percentile_5.mean * 100.0,
            report.percentile_95.mean * 100.0,
            report.success_rate.mean * 100.0,
            report.elapsed_ms.mean,
            status,
        );
        for entry in &report.allocation {
            println!("      {:<36} {:>18}", entry.pool, entry.amount);
        }
        reports.push(report);
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed()).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(98));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_start.elapsed().as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string();

    let report = ForecastReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        trials_per_run: config.trial_count,
        runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: reports,
    };

    std::fs::create_dir_all(&cli.out)?;
    let path = cli.out.join(format!("forecast-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("  Results saved to: {}\n", path.display());

    Ok(failed == 0)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let config = load_config(&cli)?;
    let to_run = select_scenarios(&cli)?;

    println!("\n  Yield Forecast Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Trials: {} | Runs/scenario: {} | Base seed: {} | {:?}",
        config.trial_count, cli.runs, cli.seed, config.execution);
    println!("  Running {} scenario(s)...\n", to_run.len());

    match cli.polls {
        Some(polls) => run_poll_mode(&cli, &config, &to_run, polls),
        None => run_scenario_mode(&cli, &config, to_run),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,forecast=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "forecast failed");
            eprintln!("  Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
