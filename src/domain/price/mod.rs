//! Price domain - samples, rolling history and change analysis

mod price_feed;
mod price_history;
mod price_analyzer;

pub use price_feed::PriceFeed;
pub use price_history::{HistoryBuffer, HistoryStore};
pub use price_analyzer::{percent_change, PriceAnalyzer, PriceChange};

use crate::shared::errors::PriceError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default number of samples kept per symbol
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// A single observed price.
///
/// The value is always finite and strictly positive; anything else is
/// rejected at construction so downstream math never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSample {
    timestamp: DateTime<Utc>,
    value: f64,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PriceError::InvalidPrice(value));
        }
        Ok(Self { timestamp, value })
    }

    /// Sample stamped with the current time
    pub fn now(value: f64) -> Result<Self, PriceError> {
        Self::new(Utc::now(), value)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}
