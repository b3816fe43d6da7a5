//! Market data sources: live exchange ticker and simulated quotes

pub mod binance_client;
pub mod feed_router;
pub mod simulated_feed;

pub use binance_client::{BinanceClient, Candle};
pub use feed_router::FeedRouter;
pub use simulated_feed::{random_walk_step, SimulatedFeed};
