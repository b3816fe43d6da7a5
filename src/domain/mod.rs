//! Domain layer - price history, sentiment and session metrics

pub mod price;
pub mod sentiment;
pub mod session;
