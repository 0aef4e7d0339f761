// Random-Walk Market Feed — seedable stand-in for a live volatility/sentiment source
// Lives in the runner, not the library: the core only sees MarketDataPort.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use yield_forecast::MarketDataPort;

pub struct RandomWalkFeed {
    rng: ChaCha8Rng,
    volatility: f64,
    sentiment: f64,
    /// Max per-read move.
    step: f64,
    /// Optional deterministic path the walk is pulled toward.
    curve: Option<fn(u64) -> f64>,
    reads: u64,
}

impl RandomWalkFeed {
    pub fn new(rng: ChaCha8Rng, volatility: f64, sentiment: f64, step: f64) -> Self {
        Self {
            rng,
            volatility: volatility.clamp(0.0, 1.0),
            sentiment: sentiment.clamp(0.0, 1.0),
            step,
            curve: None,
            reads: 0,
        }
    }

    pub fn with_curve(mut self, curve: Option<fn(u64) -> f64>) -> Self {
        self.curve = curve;
        self
    }
}

impl MarketDataPort for RandomWalkFeed {
    fn volatility(&mut self) -> f64 {
        let drift = self.rng.gen_range(-self.step..=self.step);
        self.volatility = match self.curve {
            // half-way toward the curve, plus noise
            Some(curve) => 0.5 * (self.volatility + curve(self.reads)) + drift,
            None => self.volatility + drift,
        }
        .clamp(0.0, 1.0);
        self.reads += 1;
        self.volatility
    }

    fn sentiment(&mut self) -> f64 {
        let drift = self.rng.gen_range(-self.step..=self.step);
        self.sentiment = (self.sentiment + drift).clamp(0.0, 1.0);
        self.sentiment
    }
}
