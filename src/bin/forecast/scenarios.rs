// Scenario Definitions — built-in pool sets and market regimes
// Every scenario is data: pools, capital, conditions and pass criteria.

use yield_forecast::{ConditionRegime, MarketConditions, Pool, PoolRegistry};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub capital: f64,
    pub pools: Vec<Pool>,
    pub conditions: MarketConditions,
    /// Overrides the configured regime when set.
    pub regime: Option<ConditionRegime>,
    /// Volatility path for poll mode (poll index -> volatility).
    pub volatility_curve: Option<fn(u64) -> f64>,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    /// Mean yield must land inside this band.
    pub mean_band: (f64, f64),
    pub min_success_rate: Option<f64>,
    /// Minimum fraction of capital in stable pools.
    pub min_stable_share: Option<f64>,
    /// Maximum fraction of capital in stable pools.
    pub max_stable_share: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            mean_band: (-1.0, 2.0),
            min_success_rate: None,
            min_stable_share: None,
            max_stable_share: None,
        }
    }
}

// ─── Curve Functions ────────────────────────────────────────────────────────

fn volatility_spike(poll: u64) -> f64 {
    let t = poll as f64;
    if poll < 10 { 0.2 + t * 0.07 } else if poll < 20 { 0.9 } else { 0.3 }
}

fn volatility_wave(poll: u64) -> f64 {
    0.5 + (poll as f64 / 4.0).sin() * 0.45
}

// ─── Pool Sets ──────────────────────────────────────────────────────────────

fn stress_pair() -> Vec<Pool> {
    vec![
        Pool::new("RLUSD/XRP", 0.35).stable(),
        Pool::new("Solar/XRP", 0.30).eco(),
    ]
}

fn xrpl_defaults() -> Vec<Pool> {
    PoolRegistry::xrpl_defaults().into()
}

fn volatile_only() -> Vec<Pool> {
    vec![
        Pool::new("Solar/XRP", 0.30).eco(),
        Pool::new("Wind/XRP", 0.42).eco(),
        Pool::new("SOLO/XRP", 0.55),
    ]
}

// ─── Scenario List ──────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "XRPL_STRESS_PAIR",
            label: "Stress: RLUSD/XRP + Solar/XRP @ 0.96",
            category: "stress",
            capital: 10_000.0,
            pools: stress_pair(),
            conditions: MarketConditions::new(0.96, 0.7),
            regime: None,
            volatility_curve: Some(volatility_spike),
            criteria: PassCriteria {
                mean_band: (0.25, 0.43),
                min_stable_share: Some(0.79),
                max_stable_share: Some(0.81),
                ..Default::default()
            },
        },
        Scenario {
            name: "CALM_MARKET",
            label: "Calm: XRPL presets @ 0.20",
            category: "baseline",
            capital: 250_000.0,
            pools: xrpl_defaults(),
            conditions: MarketConditions::new(0.2, 0.6),
            regime: None,
            volatility_curve: Some(volatility_wave),
            criteria: PassCriteria {
                mean_band: (0.25, 0.45),
                min_success_rate: Some(0.95),
                max_stable_share: Some(0.6),
                ..Default::default()
            },
        },
        Scenario {
            name: "HIGH_VOL_PRESETS",
            label: "High vol: XRPL presets @ 0.80",
            category: "stress",
            capital: 250_000.0,
            pools: xrpl_defaults(),
            conditions: MarketConditions::new(0.8, 0.3),
            regime: None,
            volatility_curve: Some(volatility_spike),
            criteria: PassCriteria {
                mean_band: (0.15, 0.45),
                min_stable_share: Some(0.79),
                ..Default::default()
            },
        },
        Scenario {
            name: "THRESHOLD_EDGE",
            label: "Threshold edge: presets @ 0.51",
            category: "boundary",
            capital: 100_000.0,
            pools: xrpl_defaults(),
            conditions: MarketConditions::new(0.51, 0.5),
            regime: None,
            volatility_curve: None,
            criteria: PassCriteria {
                mean_band: (0.15, 0.45),
                min_stable_share: Some(0.79),
                ..Default::default()
            },
        },
        Scenario {
            name: "NO_STABLE_FALLBACK",
            label: "Fallback: no stable pools @ 0.90",
            category: "boundary",
            capital: 30_000.0,
            pools: volatile_only(),
            conditions: MarketConditions::new(0.9, 0.5),
            regime: None,
            volatility_curve: None,
            criteria: PassCriteria {
                mean_band: (0.25, 0.60),
                max_stable_share: Some(0.0),
                ..Default::default()
            },
        },
        Scenario {
            name: "REGIME_RESAMPLE",
            label: "Resampled regime: presets @ 0.50±0.25",
            category: "regime",
            capital: 100_000.0,
            pools: xrpl_defaults(),
            conditions: MarketConditions::new(0.5, 0.5),
            regime: Some(ConditionRegime::Resample { spread: 0.25 }),
            volatility_curve: None,
            criteria: PassCriteria {
                mean_band: (0.15, 0.45),
                ..Default::default()
            },
        },
    ]
}
