//! Moving-average deviation sentiment score

use tracing::debug;

use crate::domain::price::HistoryBuffer;
use crate::shared::utils::mean;
use super::{NoiseSource, SentimentConfig, SentimentLabel, SentimentReading};

/// Computes the sentiment index.
///
/// `score = neutral + (latest - avg) / avg * amplification + noise`,
/// rounded and clamped to `[min_score, max_score]`, where `avg` is the mean
/// of the last `window` samples. Below `window` samples the neutral score
/// is returned unchanged.
#[derive(Debug, Clone)]
pub struct SentimentEngine {
    config: SentimentConfig,
}

impl SentimentEngine {
    pub fn new(config: SentimentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.config
    }

    pub fn score(&self, history: &HistoryBuffer, noise: &mut dyn NoiseSource) -> u8 {
        let window = self.config.window.max(1);
        if history.len() < window {
            return self.neutral();
        }

        let values: Vec<f64> = history.window(window).iter().map(|s| s.value()).collect();
        let (Some(avg), Some(latest)) = (mean(&values), history.latest()) else {
            return self.neutral();
        };
        if avg <= 0.0 || !avg.is_finite() {
            return self.neutral();
        }

        let deviation = (latest.value() - avg) / avg * self.config.amplification;
        let raw = self.config.neutral_score as f64 + deviation + noise.sample(self.config.noise_bound);
        debug!("sentiment: avg={:.4} latest={:.4} raw={:.2}", avg, latest.value(), raw);

        if raw.is_nan() {
            return self.neutral();
        }
        self.clamp(raw.round())
    }

    pub fn reading(&self, history: &HistoryBuffer, noise: &mut dyn NoiseSource) -> SentimentReading {
        let score = self.score(history, noise);
        SentimentReading {
            score,
            label: SentimentLabel::from_score(score, &self.config.labels),
            warming_up: history.len() < self.config.window.max(1),
        }
    }

    fn neutral(&self) -> u8 {
        self.clamp(self.config.neutral_score as f64)
    }

    fn clamp(&self, value: f64) -> u8 {
        let lower = self.config.min_score.min(self.config.max_score) as f64;
        let upper = self.config.max_score.max(self.config.min_score) as f64;
        value.clamp(lower, upper) as u8
    }
}

impl Default for SentimentEngine {
    fn default() -> Self {
        Self::new(SentimentConfig::default())
    }
}
