//! Price feed interface

use async_trait::async_trait;

use crate::shared::errors::PriceError;
use crate::shared::types::AssetSpec;
use super::PriceSample;

/// Uniform source of price samples.
///
/// Implementations never panic on bad upstream data; every failure is a
/// `PriceError`, which callers treat as "unavailable for this tick".
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the next price for `asset`.
    ///
    /// `reference` is the most recent known price, used by feeds that derive
    /// the next value from the previous one.
    async fn fetch(&self, asset: &AssetSpec, reference: Option<f64>) -> Result<PriceSample, PriceError>;

    /// Up to `count` historical samples, oldest first.
    async fn backfill(
        &self,
        _asset: &AssetSpec,
        _reference: Option<f64>,
        _count: usize,
    ) -> Result<Vec<PriceSample>, PriceError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str;
}
