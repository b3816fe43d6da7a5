//! Price change analysis

use serde::{Deserialize, Serialize};

use crate::shared::utils::calculate_percentage_change;
use super::HistoryBuffer;

/// Absolute and relative move between a reference price and the latest one
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceChange {
    pub latest: Option<f64>,
    pub reference: Option<f64>,
    pub delta: f64,
    pub pct: f64,
}

impl PriceChange {
    pub fn between(reference: Option<f64>, latest: Option<f64>) -> Self {
        let Some(latest_value) = latest else {
            return Self {
                latest: None,
                reference,
                delta: 0.0,
                pct: 0.0,
            };
        };
        let delta = match reference {
            Some(r) if r.is_finite() && latest_value.is_finite() => latest_value - r,
            _ => 0.0,
        };
        Self {
            latest,
            reference,
            delta,
            pct: percent_change(reference, latest_value),
        }
    }

    /// Latest is known and at or above the reference
    pub fn is_up(&self) -> bool {
        self.latest.is_some() && self.delta >= 0.0
    }
}

/// Percent change from `previous` to `latest`; `0.0` without a positive previous price
pub fn percent_change(previous: Option<f64>, latest: f64) -> f64 {
    match previous {
        Some(previous) => calculate_percentage_change(previous, latest),
        None => 0.0,
    }
}

/// Analyzes price history
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceAnalyzer;

impl PriceAnalyzer {
    /// Tick-over-tick change: latest against previous
    pub fn calculate_price_change(&self, history: &HistoryBuffer) -> PriceChange {
        PriceChange::between(
            history.previous().map(|s| s.value()),
            history.latest().map(|s| s.value()),
        )
    }

    /// Change across the whole retained window: latest against the oldest sample
    pub fn change_since_first(&self, history: &HistoryBuffer) -> PriceChange {
        PriceChange::between(
            history.first().map(|s| s.value()),
            history.latest().map(|s| s.value()),
        )
    }

    pub fn is_significant_change(&self, change_percentage: f64, threshold: f64) -> bool {
        change_percentage.abs() >= threshold
    }
}
