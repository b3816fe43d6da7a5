//! Injectable jitter sources for the sentiment score

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounded random jitter. Implementations must return a value in `[-bound, bound]`.
pub trait NoiseSource: Send {
    fn sample(&mut self, bound: f64) -> f64;
}

/// Uniform jitter from any `rand` generator
#[derive(Debug, Clone)]
pub struct RandNoise<R: Rng> {
    rng: R,
}

impl<R: Rng> RandNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandNoise<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> NoiseSource for RandNoise<R> {
    fn sample(&mut self, bound: f64) -> f64 {
        if !(bound > 0.0) || !bound.is_finite() {
            return 0.0;
        }
        self.rng.gen_range(-bound..=bound)
    }
}

/// No jitter at all
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn sample(&mut self, _bound: f64) -> f64 {
        0.0
    }
}

/// Constant jitter, clamped into the requested bound
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn sample(&mut self, bound: f64) -> f64 {
        if !bound.is_finite() || !self.0.is_finite() {
            return 0.0;
        }
        let bound = bound.abs();
        self.0.clamp(-bound, bound)
    }
}
