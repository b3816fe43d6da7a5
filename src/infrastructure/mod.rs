//! Infrastructure layer - external price providers

pub mod market_data;

pub use market_data::{BinanceClient, FeedRouter, SimulatedFeed};
