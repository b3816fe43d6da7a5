use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::price::{PriceFeed, PriceSample};
use crate::shared::errors::PriceError;
use crate::shared::types::AssetSpec;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_QUOTE_SUFFIX: &str = "USDT";
pub const DEFAULT_KLINE_INTERVAL: &str = "1h";

/// `/api/v3/ticker/price` response
#[derive(Debug, Deserialize)]
struct TickerResponse {
    symbol: String,
    price: String,
}

/// One OHLC row from `/api/v3/klines`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Parse a kline row: `[open_time_ms, "open", "high", "low", "close", ...]`
    pub fn from_row(row: &[Value]) -> Result<Self, PriceError> {
        if row.len() < 5 {
            return Err(PriceError::Malformed(format!("kline row has {} columns", row.len())));
        }
        let open_ms = row[0]
            .as_i64()
            .ok_or_else(|| PriceError::Malformed("kline open time is not an integer".to_string()))?;
        let open_time = Utc
            .timestamp_millis_opt(open_ms)
            .single()
            .ok_or_else(|| PriceError::Malformed(format!("kline open time out of range: {}", open_ms)))?;

        Ok(Self {
            open_time,
            open: parse_decimal(&row[1])?,
            high: parse_decimal(&row[2])?,
            low: parse_decimal(&row[3])?,
            close: parse_decimal(&row[4])?,
        })
    }
}

/// Binance encodes prices as strings; accept plain numbers too
fn parse_decimal(value: &Value) -> Result<f64, PriceError> {
    match value {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| PriceError::Malformed(format!("'{}': {}", s, e))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PriceError::Malformed(format!("'{}' is not a float", n))),
        other => Err(PriceError::Malformed(format!("unexpected price value: {}", other))),
    }
}

/// Binance REST client for spot prices and hourly candles.
///
/// Single attempt per call, no retries: the next tick is the retry.
pub struct BinanceClient {
    http_client: Client,
    base_url: String,
    quote_suffix: String,
    kline_interval: String,
}

impl BinanceClient {
    pub fn new(base_url: &str, quote_suffix: &str, timeout: Duration) -> Result<Self, PriceError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            quote_suffix: quote_suffix.to_uppercase(),
            kline_interval: DEFAULT_KLINE_INTERVAL.to_string(),
        })
    }

    pub fn with_kline_interval(mut self, interval: &str) -> Self {
        self.kline_interval = interval.to_string();
        self
    }

    /// Exchange pair for a base asset, e.g. `BTC` -> `BTCUSDT`
    pub fn pair(&self, base: &str) -> String {
        format!("{}{}", base.to_uppercase(), self.quote_suffix)
    }

    /// Latest traded price for a base asset
    pub async fn ticker_price(&self, base: &str) -> Result<f64, PriceError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let pair = self.pair(base);
        debug!("🔍 Fetching ticker {} from {}", pair, url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("symbol", pair.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PriceError::HttpStatus(response.status().as_u16()));
        }

        let ticker: TickerResponse = response.json().await?;
        let price = ticker
            .price
            .parse::<f64>()
            .map_err(|e| PriceError::Malformed(format!("{} price '{}': {}", ticker.symbol, ticker.price, e)))?;
        Ok(price)
    }

    /// Most recent `limit` candles, oldest first
    pub async fn klines(&self, base: &str, limit: usize) -> Result<Vec<Candle>, PriceError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let pair = self.pair(base);
        let limit = limit.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("symbol", pair.as_str()),
                ("interval", self.kline_interval.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PriceError::HttpStatus(response.status().as_u16()));
        }

        let rows: Vec<Vec<Value>> = response.json().await?;
        rows.iter().map(|row| Candle::from_row(row)).collect()
    }

    /// Check the exchange answers at all
    pub async fn is_available(&self) -> bool {
        match self.http_client.get(format!("{}/api/v3/ping", self.base_url)).send().await {
            Ok(response) => {
                let is_available = response.status().is_success();
                if is_available {
                    info!("✅ Binance API is available");
                } else {
                    warn!("⚠️ Binance API returned status: {}", response.status());
                }
                is_available
            }
            Err(e) => {
                warn!("⚠️ Binance API is not available: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl PriceFeed for BinanceClient {
    async fn fetch(&self, asset: &AssetSpec, _reference: Option<f64>) -> Result<PriceSample, PriceError> {
        let price = self.ticker_price(asset.symbol.as_str()).await?;
        PriceSample::now(price)
    }

    async fn backfill(
        &self,
        asset: &AssetSpec,
        _reference: Option<f64>,
        count: usize,
    ) -> Result<Vec<PriceSample>, PriceError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let candles = self.klines(asset.symbol.as_str(), count).await?;
        candles
            .iter()
            .map(|c| PriceSample::new(c.open_time, c.close))
            .collect()
    }

    fn name(&self) -> &str {
        "binance"
    }
}
