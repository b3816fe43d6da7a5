//! Application layer - the tick pipeline and its output

pub mod dashboard;
pub mod snapshot;

pub use dashboard::{Dashboard, DashboardSession, DashboardSettings};
pub use snapshot::{AssetView, ChartPoint, DashboardSnapshot, SessionView};
