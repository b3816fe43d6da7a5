use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::price::{PriceFeed, PriceSample};
use crate::shared::errors::PriceError;
use crate::shared::types::{AssetClass, AssetSpec};

/// Routes each asset to the feed for its class and bounds every call with a timeout
pub struct FeedRouter {
    crypto: Arc<dyn PriceFeed>,
    simulated: Arc<dyn PriceFeed>,
    timeout: Duration,
}

impl FeedRouter {
    pub fn new(crypto: Arc<dyn PriceFeed>, simulated: Arc<dyn PriceFeed>, timeout: Duration) -> Self {
        Self {
            crypto,
            simulated,
            timeout,
        }
    }

    /// Feed responsible for an asset class
    pub fn feed_for(&self, class: AssetClass) -> &Arc<dyn PriceFeed> {
        match class {
            AssetClass::Crypto => &self.crypto,
            AssetClass::Equity | AssetClass::Commodity => &self.simulated,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PriceFeed for FeedRouter {
    async fn fetch(&self, asset: &AssetSpec, reference: Option<f64>) -> Result<PriceSample, PriceError> {
        let feed = self.feed_for(asset.class);
        let result = match tokio::time::timeout(self.timeout, feed.fetch(asset, reference)).await {
            Ok(result) => result,
            Err(_) => Err(PriceError::Timeout),
        };
        if let Err(e) = &result {
            warn!("⚠️ {} unavailable from {}: {}", asset.symbol, feed.name(), e);
        }
        result
    }

    async fn backfill(
        &self,
        asset: &AssetSpec,
        reference: Option<f64>,
        count: usize,
    ) -> Result<Vec<PriceSample>, PriceError> {
        let feed = self.feed_for(asset.class);
        match tokio::time::timeout(self.timeout, feed.backfill(asset, reference, count)).await {
            Ok(result) => result,
            Err(_) => Err(PriceError::Timeout),
        }
    }

    fn name(&self) -> &str {
        "router"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFeed {
        name: &'static str,
        price: f64,
        delay: Duration,
    }

    #[async_trait]
    impl PriceFeed for FixedFeed {
        async fn fetch(&self, _asset: &AssetSpec, _reference: Option<f64>) -> Result<PriceSample, PriceError> {
            tokio::time::sleep(self.delay).await;
            PriceSample::now(self.price)
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn router(crypto_delay: Duration) -> FeedRouter {
        FeedRouter::new(
            Arc::new(FixedFeed {
                name: "crypto",
                price: 60000.0,
                delay: crypto_delay,
            }),
            Arc::new(FixedFeed {
                name: "sim",
                price: 400.0,
                delay: Duration::ZERO,
            }),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_routes_by_class() {
        let router = router(Duration::ZERO);
        let btc = router.fetch(&AssetSpec::crypto("BTC"), None).await.unwrap();
        let msft = router
            .fetch(&AssetSpec::simulated("MSFT", AssetClass::Equity, 400.0, 0.0005), None)
            .await
            .unwrap();
        assert_eq!(btc.value(), 60000.0);
        assert_eq!(msft.value(), 400.0);
        assert_eq!(router.feed_for(AssetClass::Commodity).name(), "sim");
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let router = router(Duration::from_millis(500));
        let result = router.fetch(&AssetSpec::crypto("BTC"), None).await;
        assert_eq!(result, Err(PriceError::Timeout));
    }

    #[tokio::test]
    async fn test_default_backfill_is_empty() {
        let router = router(Duration::ZERO);
        let samples = router.backfill(&AssetSpec::crypto("BTC"), None, 24).await.unwrap();
        assert!(samples.is_empty());
    }
}
