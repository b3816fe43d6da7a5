//! Error handling for the application

use thiserror::Error;

/// Why a price could not be obtained this tick.
///
/// Every variant is treated as "unavailable" by the tick pipeline: it is
/// logged, the history is left untouched and the next tick tries again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    #[error("Price request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Price API returned status {0}")]
    HttpStatus(u16),

    #[error("Malformed price response: {0}")]
    Malformed(String),

    #[error("Invalid price value: {0}")]
    InvalidPrice(f64),

    #[error("No price feed for asset class: {0}")]
    NoFeed(String),
}

impl From<reqwest::Error> for PriceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PriceError::Timeout
        } else if err.is_decode() {
            PriceError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            PriceError::HttpStatus(status.as_u16())
        } else {
            PriceError::Network(err.to_string())
        }
    }
}

/// Metric input validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Principal must be a positive amount, got {0}")]
    InvalidPrincipal(f64),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Price error: {0}")]
    PriceError(#[from] PriceError),

    #[error("Metrics error: {0}")]
    MetricsError(#[from] MetricsError),
}
