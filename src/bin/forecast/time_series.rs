// Per-Poll JSONL Time Series Recorder
// Outputs one JSON line per poll for independent analysis

use serde::Serialize;
use std::io::Write;
use yield_forecast::ForecastSnapshot;

#[derive(Debug, Serialize)]
pub struct PollRecord {
    pub poll: u64,
    pub seed: u64,
    pub volatility: f64,
    pub sentiment: f64,
    pub stable_shift_active: bool,
    pub allocation: Vec<f64>,
    pub mean_yield: f64,
    pub std_dev: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub sharpe_ratio: f64,
    pub success_rate: f64,
}

impl PollRecord {
    pub fn from_snapshot(snapshot: &ForecastSnapshot) -> Self {
        Self {
            poll: snapshot.poll,
            seed: snapshot.seed,
            volatility: snapshot.conditions.volatility,
            sentiment: snapshot.conditions.sentiment,
            stable_shift_active: snapshot.stable_shift_active,
            allocation: snapshot.allocation.amounts().to_vec(),
            mean_yield: snapshot.summary.mean_yield,
            std_dev: snapshot.summary.std_dev,
            percentile_5: snapshot.summary.percentile_5,
            percentile_95: snapshot.summary.percentile_95,
            sharpe_ratio: snapshot.summary.sharpe_ratio,
            success_rate: snapshot.summary.success_rate,
        }
    }
}

/// Accumulates poll records and writes them as JSONL.
pub struct TimeSeriesRecorder {
    records: Vec<PollRecord>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub fn record(&mut self, snapshot: &ForecastSnapshot) {
        self.records.push(PollRecord::from_snapshot(snapshot));
    }

    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for record in &self.records {
            let line = serde_json::to_string(record)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
