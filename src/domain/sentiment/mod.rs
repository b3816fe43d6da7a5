//! Sentiment domain - bounded "market confidence" index derived from price history

mod noise;
mod sentiment_engine;

pub use noise::{FixedNoise, NoiseSource, RandNoise, ZeroNoise};
pub use sentiment_engine::SentimentEngine;

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;
pub const DEFAULT_AMPLIFICATION: f64 = 1000.0;
pub const DEFAULT_NOISE_BOUND: f64 = 2.0;
pub const DEFAULT_MIN_SCORE: u8 = 1;
pub const DEFAULT_MAX_SCORE: u8 = 100;
pub const NEUTRAL_SCORE: u8 = 50;

pub const EUPHORIA_THRESHOLD: u8 = 75;
pub const CONFIDENCE_THRESHOLD: u8 = 55;
pub const NEUTRAL_THRESHOLD: u8 = 45;
pub const FEAR_THRESHOLD: u8 = 25;

/// Lower bounds (inclusive) of each label band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub euphoria: u8,
    pub confidence: u8,
    pub neutral: u8,
    pub fear: u8,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            euphoria: EUPHORIA_THRESHOLD,
            confidence: CONFIDENCE_THRESHOLD,
            neutral: NEUTRAL_THRESHOLD,
            fear: FEAR_THRESHOLD,
        }
    }
}

impl LabelThresholds {
    pub fn is_ordered(&self) -> bool {
        self.fear <= self.neutral && self.neutral <= self.confidence && self.confidence <= self.euphoria
    }
}

/// Sentiment scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Samples in the moving average; fewer samples means warm-up
    pub window: usize,
    /// Multiplier applied to the relative deviation from the moving average
    pub amplification: f64,
    /// Jitter is drawn uniformly from `[-noise_bound, +noise_bound]`
    pub noise_bound: f64,
    pub min_score: u8,
    pub max_score: u8,
    pub neutral_score: u8,
    pub labels: LabelThresholds,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_SMOOTHING_WINDOW,
            amplification: DEFAULT_AMPLIFICATION,
            noise_bound: DEFAULT_NOISE_BOUND,
            min_score: DEFAULT_MIN_SCORE,
            max_score: DEFAULT_MAX_SCORE,
            neutral_score: NEUTRAL_SCORE,
            labels: LabelThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Euphoria,
    Confidence,
    Neutral,
    Fear,
    Panic,
}

impl SentimentLabel {
    pub fn from_score(score: u8, thresholds: &LabelThresholds) -> Self {
        if score >= thresholds.euphoria {
            SentimentLabel::Euphoria
        } else if score >= thresholds.confidence {
            SentimentLabel::Confidence
        } else if score >= thresholds.neutral {
            SentimentLabel::Neutral
        } else if score >= thresholds.fear {
            SentimentLabel::Fear
        } else {
            SentimentLabel::Panic
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentLabel::Euphoria => "euphoria",
            SentimentLabel::Confidence => "confidence",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Fear => "fear",
            SentimentLabel::Panic => "panic",
        };
        f.write_str(name)
    }
}

/// Score plus its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub score: u8,
    pub label: SentimentLabel,
    /// Still below the smoothing window
    pub warming_up: bool,
}
