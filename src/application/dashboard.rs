use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::price::{HistoryStore, PriceAnalyzer, PriceFeed, PriceSample};
use crate::domain::sentiment::{NoiseSource, SentimentConfig, SentimentEngine};
use crate::domain::session::{
    ProfitProjection, ProfitSimulator, SessionPerformance, SessionState, TrustIndexConfig,
};
use crate::shared::config::DashboardConfig;
use crate::shared::errors::{MetricsError, PriceError};
use crate::shared::types::{AssetSpec, Symbol};
use super::snapshot::{AssetView, ChartPoint, DashboardSnapshot, SessionView};

/// Everything the tick pipeline needs to know, resolved from the config file
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub assets: Vec<AssetSpec>,
    pub basket: Vec<Symbol>,
    pub capacity: usize,
    pub sentiment: SentimentConfig,
    pub trust_index: TrustIndexConfig,
    pub principal: Option<f64>,
    pub backfill_count: usize,
    pub alert_threshold_pct: f64,
}

impl DashboardSettings {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            assets: config.assets.clone(),
            basket: config.basket(),
            capacity: config.history.capacity,
            sentiment: config.sentiment.clone(),
            trust_index: config.trust_index,
            principal: config.session.principal,
            backfill_count: config.feed.backfill_candles,
            alert_threshold_pct: config.history.alert_threshold_pct,
        }
    }
}

/// Session context: rolling histories plus the basket's initial prices.
///
/// Created once at session start and threaded through every tick.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    state: SessionState,
    history: HistoryStore,
}

impl DashboardSession {
    pub fn new(basket: Vec<Symbol>, capacity: usize) -> Self {
        Self {
            state: SessionState::new(basket),
            history: HistoryStore::new(capacity),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Append a fetch outcome; the first valid price of a basket member becomes its initial price
    pub fn ingest(&mut self, symbol: &Symbol, outcome: &Result<PriceSample, PriceError>) -> bool {
        if !self.history.append(symbol, outcome) {
            return false;
        }
        if let Ok(sample) = outcome {
            if self.state.record_initial_price(symbol, sample.value()) {
                debug!("📌 Initial price for {}: {}", symbol, sample.value());
            }
        }
        true
    }

    /// Preload older samples. Does not touch initial prices.
    pub fn seed(&mut self, symbol: &Symbol, samples: &[PriceSample]) -> usize {
        self.history.seed(symbol, samples)
    }

    pub fn performance(&self) -> SessionPerformance {
        self.state.performance_from_history(&self.history)
    }
}

struct TickState<N> {
    noise: N,
    ticks: u64,
}

/// Fetch -> append -> compute pipeline for one dashboard.
///
/// At most one tick (or backfill) runs at a time; fetches inside a tick run
/// in parallel across symbols. Readers may take the session read lock
/// between ticks and never observe a half-applied tick.
pub struct Dashboard<N: NoiseSource> {
    settings: DashboardSettings,
    feed: Arc<dyn PriceFeed>,
    session: Arc<RwLock<DashboardSession>>,
    tick_state: Mutex<TickState<N>>,
    analyzer: PriceAnalyzer,
    sentiment: SentimentEngine,
    simulator: ProfitSimulator,
}

impl<N: NoiseSource> Dashboard<N> {
    pub fn new(settings: DashboardSettings, feed: Arc<dyn PriceFeed>, noise: N) -> Self {
        let session = DashboardSession::new(settings.basket.clone(), settings.capacity);
        info!(
            "🆕 Session {} started: {} assets, basket of {}",
            session.state().id(),
            settings.assets.len(),
            session.state().basket().len()
        );
        Self {
            sentiment: SentimentEngine::new(settings.sentiment.clone()),
            settings,
            feed,
            session: Arc::new(RwLock::new(session)),
            tick_state: Mutex::new(TickState { noise, ticks: 0 }),
            analyzer: PriceAnalyzer,
            simulator: ProfitSimulator,
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Shared handle for readers
    pub fn session(&self) -> Arc<RwLock<DashboardSession>> {
        Arc::clone(&self.session)
    }

    /// Copy of the current session state
    pub async fn session_snapshot(&self) -> DashboardSession {
        self.session.read().await.clone()
    }

    pub async fn ticks(&self) -> u64 {
        self.tick_state.lock().await.ticks
    }

    /// Load recent history for every asset. Failures leave that symbol empty.
    pub async fn backfill(&self) -> usize {
        let count = self.settings.backfill_count;
        if count == 0 {
            return 0;
        }
        let _guard = self.tick_state.lock().await;

        let requests = self
            .settings
            .assets
            .iter()
            .map(|asset| self.feed.backfill(asset, None, count));
        let results = join_all(requests).await;

        let mut session = self.session.write().await;
        let mut seeded = 0;
        for (asset, result) in self.settings.assets.iter().zip(results) {
            match result {
                Ok(samples) => {
                    let len = session.seed(&asset.symbol, &samples);
                    info!("📈 Backfilled {} with {} samples", asset.symbol, len);
                    seeded += samples.len();
                }
                Err(e) => warn!("⚠️ Backfill failed for {}: {}", asset.symbol, e),
            }
        }
        seeded
    }

    /// Run one full tick and return what the presentation layer should show
    pub async fn tick(&self) -> DashboardSnapshot {
        let mut tick_state = self.tick_state.lock().await;
        tick_state.ticks += 1;
        let tick = tick_state.ticks;

        let references: Vec<Option<f64>> = {
            let session = self.session.read().await;
            self.settings
                .assets
                .iter()
                .map(|asset| session.history().latest(&asset.symbol).map(|s| s.value()))
                .collect()
        };

        let fetches = self
            .settings
            .assets
            .iter()
            .zip(references)
            .map(|(asset, reference)| self.feed.fetch(asset, reference));
        let outcomes: Vec<Result<PriceSample, PriceError>> = join_all(fetches).await;

        let mut session = self.session.write().await;
        let mut appended = 0;
        for (asset, outcome) in self.settings.assets.iter().zip(&outcomes) {
            if session.ingest(&asset.symbol, outcome) {
                appended += 1;
            }
        }
        let session = session.downgrade();

        let snapshot = self.build_snapshot(&session, tick, &mut tick_state.noise, &outcomes);
        info!(
            "📊 Tick {}: {}/{} prices, session {:+.2}% over {} symbols, trust {:.0}",
            tick,
            appended,
            self.settings.assets.len(),
            snapshot.session.performance.mean_pct,
            snapshot.session.performance.contributing(),
            snapshot.session.trust_index
        );
        snapshot
    }

    /// Project a principal over the current session performance
    pub async fn simulate_profit(&self, principal: f64) -> Result<ProfitProjection, MetricsError> {
        let performance = self.session.read().await.performance();
        self.simulator.project(principal, performance.mean_pct)
    }

    fn build_snapshot(
        &self,
        session: &DashboardSession,
        tick: u64,
        noise: &mut N,
        outcomes: &[Result<PriceSample, PriceError>],
    ) -> DashboardSnapshot {
        let assets = self
            .settings
            .assets
            .iter()
            .zip(outcomes)
            .map(|(asset, outcome)| {
                let history = session.history().get(&asset.symbol);
                let change = self.analyzer.calculate_price_change(history);
                let available = outcome.is_ok();
                AssetView {
                    symbol: asset.symbol.clone(),
                    class: asset.class,
                    available,
                    error: outcome.as_ref().err().map(|e| e.to_string()),
                    latest: history.latest().map(|s| s.value()),
                    change,
                    window_change: self.analyzer.change_since_first(history),
                    significant_move: available
                        && self
                            .analyzer
                            .is_significant_change(change.pct, self.settings.alert_threshold_pct),
                    sentiment: self.sentiment.reading(history, noise),
                    initial_price: session.state().initial_price(&asset.symbol),
                    history: history.iter().map(ChartPoint::from).collect(),
                }
            })
            .collect();

        let performance = session.performance();
        let trust_index = self.settings.trust_index.index(performance.mean_pct);
        let profit = self.settings.principal.and_then(|principal| {
            match self.simulator.project(principal, performance.mean_pct) {
                Ok(projection) => Some(projection),
                Err(e) => {
                    warn!("⚠️ Profit simulation skipped: {}", e);
                    None
                }
            }
        });

        DashboardSnapshot {
            tick,
            generated_at: Utc::now(),
            assets,
            session: SessionView {
                id: session.state().id(),
                started_at: session.state().started_at(),
                performance,
                trust_index,
                profit,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::{FixedNoise, ZeroNoise};
    use crate::shared::types::AssetClass;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};

    /// Plays back a fixed sequence of outcomes per symbol; exhausted means timeout
    struct ScriptedFeed {
        scripts: std::sync::Mutex<HashMap<Symbol, VecDeque<Result<f64, PriceError>>>>,
        backfill: Vec<f64>,
    }

    impl ScriptedFeed {
        fn new(scripts: &[(&str, Vec<Result<f64, PriceError>>)]) -> Self {
            Self {
                scripts: std::sync::Mutex::new(
                    scripts
                        .iter()
                        .map(|(s, v)| (Symbol::from(*s), v.iter().cloned().collect()))
                        .collect(),
                ),
                backfill: Vec::new(),
            }
        }

        fn with_backfill(mut self, values: &[f64]) -> Self {
            self.backfill = values.to_vec();
            self
        }
    }

    #[async_trait]
    impl PriceFeed for ScriptedFeed {
        async fn fetch(&self, asset: &AssetSpec, _reference: Option<f64>) -> Result<PriceSample, PriceError> {
            let next = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(&asset.symbol)
                .and_then(|q| q.pop_front())
                .unwrap_or(Err(PriceError::Timeout));
            PriceSample::now(next?)
        }

        async fn backfill(
            &self,
            _asset: &AssetSpec,
            _reference: Option<f64>,
            _count: usize,
        ) -> Result<Vec<PriceSample>, PriceError> {
            self.backfill.iter().map(|v| PriceSample::now(*v)).collect()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn settings(symbols: &[&str], capacity: usize, window: usize) -> DashboardSettings {
        let assets: Vec<AssetSpec> = symbols.iter().map(|s| AssetSpec::crypto(s)).collect();
        DashboardSettings {
            basket: assets.iter().map(|a| a.symbol.clone()).collect(),
            assets,
            capacity,
            sentiment: SentimentConfig {
                window,
                ..SentimentConfig::default()
            },
            trust_index: TrustIndexConfig::default(),
            principal: None,
            backfill_count: 24,
            alert_threshold_pct: 1.0,
        }
    }

    fn ok(values: &[f64]) -> Vec<Result<f64, PriceError>> {
        values.iter().map(|v| Ok(*v)).collect()
    }

    #[tokio::test]
    async fn test_capacity_scenario_through_pipeline() {
        let feed = ScriptedFeed::new(&[("A", ok(&[10.0, 20.0, 30.0, 40.0]))]);
        let dashboard = Dashboard::new(settings(&["A"], 3, 3), Arc::new(feed), ZeroNoise);

        let mut snapshot = dashboard.tick().await;
        for _ in 0..3 {
            snapshot = dashboard.tick().await;
        }

        let view = snapshot.asset(&Symbol::from("A")).unwrap();
        let values: Vec<f64> = view.history.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![20.0, 30.0, 40.0]);
        assert_eq!(view.change.delta, 10.0);
        assert!((view.change.pct - 33.33).abs() < 0.01);
        assert!(view.significant_move);
        assert_eq!(snapshot.tick, 4);
    }

    #[tokio::test]
    async fn test_unavailable_symbol_does_not_block_others() {
        let feed = ScriptedFeed::new(&[
            ("A", vec![Ok(100.0), Err(PriceError::HttpStatus(503))]),
            ("B", ok(&[50.0, 51.0])),
        ]);
        let dashboard = Dashboard::new(settings(&["A", "B"], 10, 5), Arc::new(feed), ZeroNoise);

        dashboard.tick().await;
        let snapshot = dashboard.tick().await;

        let a = snapshot.asset(&Symbol::from("A")).unwrap();
        assert!(!a.available);
        assert_eq!(a.error.as_deref(), Some("Price API returned status 503"));
        assert_eq!(a.latest, Some(100.0));
        assert_eq!(a.history.len(), 1);
        assert!(!a.significant_move);

        let b = snapshot.asset(&Symbol::from("B")).unwrap();
        assert!(b.available);
        assert_eq!(b.history.len(), 2);
        assert_eq!(snapshot.unavailable().count(), 1);
    }

    #[tokio::test]
    async fn test_session_performance_and_trust() {
        let feed = ScriptedFeed::new(&[("A", ok(&[100.0, 110.0])), ("B", ok(&[50.0, 45.0]))]);
        let dashboard = Dashboard::new(settings(&["A", "B"], 10, 5), Arc::new(feed), ZeroNoise);

        dashboard.tick().await;
        let snapshot = dashboard.tick().await;

        let a = snapshot.asset(&Symbol::from("A")).unwrap();
        assert_eq!(a.initial_price, Some(100.0));
        assert_eq!(snapshot.session.performance.contributing(), 2);
        assert!(snapshot.session.performance.mean_pct.abs() < 1e-9);
        assert!((snapshot.session.trust_index - 50.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_initial_price_waits_for_first_success() {
        let feed = ScriptedFeed::new(&[("A", vec![Err(PriceError::Timeout), Ok(80.0), Ok(88.0)])]);
        let dashboard = Dashboard::new(settings(&["A"], 10, 5), Arc::new(feed), ZeroNoise);

        let first = dashboard.tick().await;
        assert_eq!(first.session.performance.mean_pct, 0.0);
        assert_eq!(first.asset(&Symbol::from("A")).unwrap().latest, None);

        dashboard.tick().await;
        let third = dashboard.tick().await;
        assert_eq!(third.asset(&Symbol::from("A")).unwrap().initial_price, Some(80.0));
        assert!((third.session.performance.mean_pct - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_profit_projection() {
        let feed = ScriptedFeed::new(&[("A", ok(&[100.0, 102.5]))]);
        let mut settings = settings(&["A"], 10, 5);
        settings.principal = Some(1000.0);
        let dashboard = Dashboard::new(settings, Arc::new(feed), ZeroNoise);

        dashboard.tick().await;
        let snapshot = dashboard.tick().await;
        let profit = snapshot.session.profit.unwrap();
        assert!((profit.final_value - 1025.0).abs() < 1e-9);
        assert!((profit.gain - 25.0).abs() < 1e-9);

        assert!(dashboard.simulate_profit(500.0).await.is_ok());
        assert_eq!(
            dashboard.simulate_profit(0.0).await,
            Err(MetricsError::InvalidPrincipal(0.0))
        );
    }

    #[tokio::test]
    async fn test_sentiment_warm_up_in_pipeline() {
        let feed = ScriptedFeed::new(&[("A", ok(&[100.0, 130.0, 90.0, 150.0]))]);
        let dashboard = Dashboard::new(settings(&["A"], 30, 10), Arc::new(feed), FixedNoise(2.0));

        let mut snapshot = dashboard.tick().await;
        for _ in 0..3 {
            snapshot = dashboard.tick().await;
        }
        let sentiment = snapshot.asset(&Symbol::from("A")).unwrap().sentiment;
        assert_eq!(sentiment.score, 50);
        assert!(sentiment.warming_up);
    }

    #[tokio::test]
    async fn test_backfill_seeds_history_without_initial_price() {
        let feed = ScriptedFeed::new(&[("A", ok(&[105.0]))]).with_backfill(&[100.0, 101.0, 102.0]);
        let dashboard = Dashboard::new(settings(&["A"], 10, 3), Arc::new(feed), ZeroNoise);

        assert_eq!(dashboard.backfill().await, 3);
        let session = dashboard.session_snapshot().await;
        assert_eq!(session.history().get(&Symbol::from("A")).len(), 3);
        assert_eq!(session.state().initial_price(&Symbol::from("A")), None);

        let snapshot = dashboard.tick().await;
        let a = snapshot.asset(&Symbol::from("A")).unwrap();
        assert_eq!(a.initial_price, Some(105.0));
        assert_eq!(a.history.len(), 4);
        assert!(!a.sentiment.warming_up);
        assert_eq!(a.window_change.reference, Some(100.0));
    }

    #[tokio::test]
    async fn test_concurrent_ticks_are_serialized() {
        let feed = ScriptedFeed::new(&[("A", ok(&[1.0, 2.0])), ("B", ok(&[3.0, 4.0]))]);
        let dashboard = Dashboard::new(settings(&["A", "B"], 10, 5), Arc::new(feed), ZeroNoise);

        let (x, y) = tokio::join!(dashboard.tick(), dashboard.tick());
        let mut ticks = vec![x.tick, y.tick];
        ticks.sort();
        assert_eq!(ticks, vec![1, 2]);
        assert_eq!(dashboard.ticks().await, 2);

        let session = dashboard.session_snapshot().await;
        assert_eq!(session.history().get(&Symbol::from("A")).values(), vec![1.0, 2.0]);
        assert_eq!(session.history().get(&Symbol::from("B")).values(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_settings_from_default_config() {
        let config = DashboardConfig::default();
        let settings = DashboardSettings::from_config(&config);
        assert_eq!(settings.assets.len(), 6);
        assert_eq!(settings.basket.len(), 6);
        assert!(settings.assets.iter().any(|a| a.class == AssetClass::Commodity));
    }
}
