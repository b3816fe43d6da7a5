//! Blishko - live market dashboard core
//! Rolling price history, sentiment index and session performance

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::{Dashboard, DashboardSession, DashboardSnapshot};
pub use domain::price::{HistoryBuffer, HistoryStore, PriceAnalyzer, PriceFeed, PriceSample};
pub use domain::sentiment::SentimentEngine;
pub use domain::session::{ProfitSimulator, SessionState};
pub use shared::config::{ConfigLoader, DashboardConfig};
