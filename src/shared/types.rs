//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tradable asset identifier, e.g. `BTC` or `MSFT`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Where quotes for an asset come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Live exchange ticker
    Crypto,
    /// Random-walk simulation
    Equity,
    /// Random-walk simulation, usually with a lower volatility
    Commodity,
}

impl AssetClass {
    pub fn is_simulated(&self) -> bool {
        !matches!(self, AssetClass::Crypto)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetClass::Crypto => "crypto",
            AssetClass::Equity => "equity",
            AssetClass::Commodity => "commodity",
        };
        f.write_str(name)
    }
}

/// One tracked asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub symbol: Symbol,
    pub class: AssetClass,
    /// Starting price of a simulated asset
    #[serde(default)]
    pub base_price: Option<f64>,
    /// Per-tick standard deviation of a simulated asset's relative move
    #[serde(default)]
    pub volatility: Option<f64>,
}

impl AssetSpec {
    pub fn crypto(symbol: &str) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            class: AssetClass::Crypto,
            base_price: None,
            volatility: None,
        }
    }

    pub fn simulated(symbol: &str, class: AssetClass, base_price: f64, volatility: f64) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            class,
            base_price: Some(base_price),
            volatility: Some(volatility),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_normalized() {
        assert_eq!(Symbol::new(" btc "), Symbol::from("BTC"));
        assert_eq!(Symbol::new("msft").to_string(), "MSFT");
    }

    #[test]
    fn test_asset_class_simulation() {
        assert!(!AssetClass::Crypto.is_simulated());
        assert!(AssetClass::Equity.is_simulated());
        assert!(AssetClass::Commodity.is_simulated());
    }

    #[test]
    fn test_asset_spec_deserialize() {
        let spec: AssetSpec = toml::from_str(
            r#"
            symbol = "gold"
            class = "commodity"
            base_price = 2045.0
            volatility = 0.0002
            "#,
        )
        .unwrap();
        assert_eq!(spec.symbol.as_str(), "GOLD");
        assert_eq!(spec.class, AssetClass::Commodity);
        assert_eq!(spec.volatility, Some(0.0002));
    }
}
