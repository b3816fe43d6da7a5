use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domain::price::DEFAULT_HISTORY_CAPACITY;
use crate::domain::sentiment::SentimentConfig;
use crate::domain::session::TrustIndexConfig;
use crate::shared::errors::AppError;
use crate::shared::types::{AssetClass, AssetSpec, Symbol};

pub const DEFAULT_CONFIG_PATH: &str = "Config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub binance_base_url: String,
    pub quote_suffix: String,
    pub timeout_ms: u64,
    pub tick_interval_ms: u64,
    /// Historical points loaded per symbol at session start; 0 disables backfill
    pub backfill_candles: usize,
    pub backfill_interval: String,
    /// Seed for simulated quotes and sentiment noise
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            binance_base_url: "https://api.binance.com".to_string(),
            quote_suffix: "USDT".to_string(),
            timeout_ms: 2_000,
            tick_interval_ms: 5_000,
            backfill_candles: 24,
            backfill_interval: "1h".to_string(),
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    /// Tick-over-tick move (in %) flagged as significant
    pub alert_threshold_pct: f64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            alert_threshold_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Symbols aggregated into session performance; empty means every asset
    pub basket: Vec<Symbol>,
    /// Amount fed to the profit simulator on every tick
    pub principal: Option<f64>,
}

/// Full dashboard configuration, loaded from `Config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub feed: FeedConfig,
    pub history: HistoryConfig,
    pub sentiment: SentimentConfig,
    pub trust_index: TrustIndexConfig,
    pub session: SessionConfig,
    pub assets: Vec<AssetSpec>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            history: HistoryConfig::default(),
            sentiment: SentimentConfig::default(),
            trust_index: TrustIndexConfig::default(),
            session: SessionConfig::default(),
            assets: default_assets(),
        }
    }
}

/// Three crypto pairs plus two equities and gold
pub fn default_assets() -> Vec<AssetSpec> {
    vec![
        AssetSpec::crypto("BTC"),
        AssetSpec::crypto("XRP"),
        AssetSpec::crypto("RENDER"),
        AssetSpec::simulated("MSFT", AssetClass::Equity, 402.50, 0.0005),
        AssetSpec::simulated("GOOGL", AssetClass::Equity, 173.20, 0.0005),
        AssetSpec::simulated("GOLD", AssetClass::Commodity, 2045.00, 0.0002),
    ]
}

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        toml::from_str(content).map_err(|e| AppError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::ConfigError(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Basket symbols, defaulting to every configured asset
    pub fn basket(&self) -> Vec<Symbol> {
        if self.session.basket.is_empty() {
            self.assets.iter().map(|a| a.symbol.clone()).collect()
        } else {
            self.session.basket.clone()
        }
    }

    pub fn asset(&self, symbol: &Symbol) -> Option<&AssetSpec> {
        self.assets.iter().find(|a| &a.symbol == symbol)
    }

    /// Keep only the listed symbols, in the given order
    pub fn retain_symbols(&mut self, symbols: &[Symbol]) -> Result<(), AppError> {
        let mut selected = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let asset = self
                .asset(symbol)
                .cloned()
                .ok_or_else(|| AppError::ConfigError(format!("Unknown symbol: {}", symbol)))?;
            selected.push(asset);
        }
        let basket: Vec<Symbol> = self
            .session
            .basket
            .iter()
            .filter(|s| symbols.contains(s))
            .cloned()
            .collect();
        if basket.is_empty() && !self.session.basket.is_empty() {
            return Err(AppError::ConfigError(format!(
                "None of the basket members ({}) are among the selected symbols",
                self.session
                    .basket
                    .iter()
                    .map(Symbol::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        self.assets = selected;
        self.session.basket = basket;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let fail = |msg: String| Err(AppError::ConfigError(msg));

        if self.assets.is_empty() {
            return fail("at least one asset must be configured".to_string());
        }
        for (i, asset) in self.assets.iter().enumerate() {
            if self.assets[..i].iter().any(|a| a.symbol == asset.symbol) {
                return fail(format!("duplicate asset {}", asset.symbol));
            }
            if asset.class.is_simulated() {
                match asset.base_price {
                    Some(p) if p.is_finite() && p > 0.0 => {}
                    _ => return fail(format!("{} needs a positive base_price", asset.symbol)),
                }
                if let Some(v) = asset.volatility {
                    if !v.is_finite() || v < 0.0 {
                        return fail(format!("{} volatility must be >= 0", asset.symbol));
                    }
                }
            }
        }
        for symbol in &self.session.basket {
            if self.asset(symbol).is_none() {
                return fail(format!("basket member {} is not a configured asset", symbol));
            }
        }
        if let Some(principal) = self.session.principal {
            if !principal.is_finite() || principal <= 0.0 {
                return fail(format!("principal must be positive, got {}", principal));
            }
        }

        if self.history.capacity == 0 {
            return fail("history.capacity must be at least 1".to_string());
        }
        if self.feed.timeout_ms == 0 {
            return fail("feed.timeout_ms must be at least 1".to_string());
        }
        if self.feed.tick_interval_ms == 0 {
            return fail("feed.tick_interval_ms must be at least 1".to_string());
        }

        let s = &self.sentiment;
        if s.window == 0 {
            return fail("sentiment.window must be at least 1".to_string());
        }
        if s.window > self.history.capacity {
            return fail(format!(
                "sentiment.window ({}) exceeds history.capacity ({})",
                s.window, self.history.capacity
            ));
        }
        if s.min_score > s.max_score {
            return fail(format!("sentiment.min_score {} > max_score {}", s.min_score, s.max_score));
        }
        if !(s.min_score..=s.max_score).contains(&s.neutral_score) {
            return fail("sentiment.neutral_score must lie within the score bounds".to_string());
        }
        if !s.amplification.is_finite() || !s.noise_bound.is_finite() || s.noise_bound < 0.0 {
            return fail("sentiment.amplification and noise_bound must be finite, noise_bound >= 0".to_string());
        }
        if !s.labels.is_ordered() {
            return fail("sentiment.labels must satisfy fear <= neutral <= confidence <= euphoria".to_string());
        }

        let t = &self.trust_index;
        if !(t.lower.is_finite() && t.upper.is_finite() && t.gain.is_finite()) || t.lower > t.upper {
            return fail("trust_index bounds must be finite with lower <= upper".to_string());
        }
        Ok(())
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DashboardConfig, AppError> {
        let config = DashboardConfig::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `Config.toml` from the working directory, or defaults when it is absent
    pub fn load_or_default() -> Result<DashboardConfig, AppError> {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load(DEFAULT_CONFIG_PATH)
        } else {
            Ok(DashboardConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.basket().len(), 6);
        assert_eq!(config.history.capacity, 30);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [feed]
            timeout_ms = 3000
            tick_interval_ms = 1500
            seed = 7

            [history]
            capacity = 100

            [sentiment]
            window = 5
            min_score = 5
            max_score = 95

            [sentiment.labels]
            euphoria = 80

            [trust_index]
            gain = 4.0

            [session]
            basket = ["BTC", "MSFT"]
            principal = 1000.0

            [[assets]]
            symbol = "BTC"
            class = "crypto"

            [[assets]]
            symbol = "MSFT"
            class = "equity"
            base_price = 402.5
            volatility = 0.0005
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.feed.timeout_ms, 3000);
        assert_eq!(config.feed.seed, Some(7));
        assert_eq!(config.feed.quote_suffix, "USDT");
        assert_eq!(config.sentiment.window, 5);
        assert_eq!(config.sentiment.labels.euphoria, 80);
        assert_eq!(config.sentiment.labels.fear, 25);
        assert_eq!(config.trust_index.gain, 4.0);
        assert_eq!(config.basket(), vec![Symbol::from("BTC"), Symbol::from("MSFT")]);
        assert_eq!(config.assets.len(), 2);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = DashboardConfig::default();
        config.history.capacity = 5;
        assert!(config.validate().is_err(), "window larger than capacity");

        let mut config = DashboardConfig::default();
        config.sentiment.min_score = 90;
        config.sentiment.max_score = 10;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.session.basket = vec![Symbol::from("DOGE")];
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.session.principal = Some(-5.0);
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.assets.push(AssetSpec {
            base_price: None,
            ..AssetSpec::simulated("TSLA", AssetClass::Equity, 1.0, 0.001)
        });
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.assets.push(AssetSpec::crypto("BTC"));
        assert!(config.validate().is_err(), "duplicate symbol");

        let mut config = DashboardConfig::default();
        config.assets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retain_symbols() {
        let mut config = DashboardConfig::default();
        config.session.basket = vec![Symbol::from("BTC"), Symbol::from("GOLD")];
        config
            .retain_symbols(&[Symbol::from("GOLD"), Symbol::from("XRP")])
            .unwrap();
        assert_eq!(config.assets.len(), 2);
        assert_eq!(config.assets[0].symbol.as_str(), "GOLD");
        assert_eq!(config.session.basket, vec![Symbol::from("GOLD")]);
        assert!(config.retain_symbols(&[Symbol::from("DOGE")]).is_err());
    }

    #[test]
    fn test_retain_symbols_keeps_configured_basket() {
        let mut config = DashboardConfig::default();
        config.session.basket = vec![Symbol::from("BTC")];
        let result = config.retain_symbols(&[Symbol::from("MSFT"), Symbol::from("GOLD")]);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
        assert_eq!(config.assets.len(), 6);
        assert_eq!(config.session.basket, vec![Symbol::from("BTC")]);

        let mut config = DashboardConfig::default();
        config
            .retain_symbols(&[Symbol::from("MSFT"), Symbol::from("GOLD")])
            .unwrap();
        assert_eq!(config.basket(), vec![Symbol::from("MSFT"), Symbol::from("GOLD")]);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = DashboardConfig::from_file("/nonexistent/blishko/Config.toml");
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
