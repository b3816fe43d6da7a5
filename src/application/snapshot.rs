//! Read-only view of one tick, handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::price::{PriceChange, PriceSample};
use crate::domain::sentiment::SentimentReading;
use crate::domain::session::{ProfitProjection, SessionPerformance};
use crate::shared::types::{AssetClass, Symbol};
use crate::shared::utils::{format_pct, format_usd};

/// One chart point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl From<&PriceSample> for ChartPoint {
    fn from(sample: &PriceSample) -> Self {
        Self {
            timestamp: sample.timestamp(),
            value: sample.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetView {
    pub symbol: Symbol,
    pub class: AssetClass,
    /// A fresh price arrived this tick
    pub available: bool,
    /// Why the price is missing this tick
    pub error: Option<String>,
    pub latest: Option<f64>,
    /// Latest against the previous sample
    pub change: PriceChange,
    /// Latest against the oldest retained sample
    pub window_change: PriceChange,
    pub significant_move: bool,
    pub sentiment: SentimentReading,
    pub initial_price: Option<f64>,
    pub history: Vec<ChartPoint>,
}

impl AssetView {
    /// One-line summary, e.g. `BTC $64,321.10 +0.12% sentiment 57 (confidence)`
    pub fn summary(&self) -> String {
        match self.latest {
            Some(price) => format!(
                "{} {} {} sentiment {} ({}){}",
                self.symbol,
                format_usd(price),
                format_pct(self.change.pct),
                self.sentiment.score,
                self.sentiment.label,
                if self.available { "" } else { " [stale]" },
            ),
            None => format!("{} unavailable", self.symbol),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub performance: SessionPerformance,
    pub trust_index: f64,
    pub profit: Option<ProfitProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub tick: u64,
    pub generated_at: DateTime<Utc>,
    pub assets: Vec<AssetView>,
    pub session: SessionView,
}

impl DashboardSnapshot {
    pub fn asset(&self, symbol: &Symbol) -> Option<&AssetView> {
        self.assets.iter().find(|a| &a.symbol == symbol)
    }

    pub fn unavailable(&self) -> impl Iterator<Item = &AssetView> {
        self.assets.iter().filter(|a| !a.available)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
