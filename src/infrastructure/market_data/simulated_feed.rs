//! Random-walk quotes for assets without a free real-time feed

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::sync::Mutex;

use crate::domain::price::{PriceFeed, PriceSample};
use crate::shared::errors::PriceError;
use crate::shared::types::AssetSpec;

/// Per-tick volatility for equities when the asset does not set one
pub const DEFAULT_EQUITY_VOLATILITY: f64 = 0.0005;
/// Relative spread of the synthetic backfill's starting point
const BACKFILL_DRIFT: f64 = 0.01;
/// Relative jitter of each synthetic backfill point
const BACKFILL_JITTER: f64 = 0.005;

/// One random-walk step: `current * (1 + N(0, sigma))`.
///
/// Falls back to `current` when `sigma` is unusable or the draw would make
/// the price non-positive.
pub fn random_walk_step<R: Rng + ?Sized>(current: f64, sigma: f64, rng: &mut R) -> f64 {
    let Ok(normal) = Normal::new(0.0, sigma) else {
        return current;
    };
    let next = current * (1.0 + normal.sample(rng));
    if next.is_finite() && next > 0.0 {
        next
    } else {
        current
    }
}

/// Simulated equity/commodity feed. Never fails for a correctly configured asset.
pub struct SimulatedFeed {
    rng: Mutex<StdRng>,
}

impl SimulatedFeed {
    pub fn new(rng: StdRng) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    fn starting_price(asset: &AssetSpec, reference: Option<f64>) -> Result<f64, PriceError> {
        reference
            .or(asset.base_price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| PriceError::NoFeed(format!("{} has no base price to simulate from", asset.symbol)))
    }

    fn volatility(asset: &AssetSpec) -> f64 {
        asset.volatility.unwrap_or(DEFAULT_EQUITY_VOLATILITY)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *rng)
    }

    /// `count` hourly points trending from a perturbed start to `current`
    fn synthetic_trend(&self, current: f64, count: usize) -> Vec<f64> {
        self.with_rng(|rng| {
            let start = random_walk_step(current, BACKFILL_DRIFT, rng);
            let jitter = Normal::new(0.0, start * BACKFILL_JITTER).ok();
            (0..count)
                .map(|i| {
                    let t = if count > 1 { i as f64 / (count - 1) as f64 } else { 1.0 };
                    let base = start + (current - start) * t;
                    let noise = jitter.map(|n| n.sample(rng)).unwrap_or(0.0);
                    let value = base + noise;
                    if value > 0.0 { value } else { base }
                })
                .collect()
        })
    }
}

#[async_trait]
impl PriceFeed for SimulatedFeed {
    async fn fetch(&self, asset: &AssetSpec, reference: Option<f64>) -> Result<PriceSample, PriceError> {
        let current = Self::starting_price(asset, reference)?;
        let sigma = Self::volatility(asset);
        let next = self.with_rng(|rng| random_walk_step(current, sigma, rng));
        PriceSample::now(next)
    }

    async fn backfill(
        &self,
        asset: &AssetSpec,
        reference: Option<f64>,
        count: usize,
    ) -> Result<Vec<PriceSample>, PriceError> {
        let current = Self::starting_price(asset, reference)?;
        let now = Utc::now();
        let points = self.synthetic_trend(current, count);
        let last = points.len().saturating_sub(1);
        points
            .into_iter()
            .enumerate()
            .map(|(i, value)| PriceSample::new(now - ChronoDuration::hours((last - i) as i64), value))
            .collect()
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
