// src/app.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use blishko::application::{Dashboard, DashboardSettings, DashboardSnapshot};
use blishko::domain::sentiment::{NoiseSource, RandNoise};
use blishko::infrastructure::{BinanceClient, FeedRouter, SimulatedFeed};
use blishko::shared::config::DashboardConfig;
use blishko::shared::types::AssetClass;
use blishko::shared::utils::format_usd;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config: DashboardConfig,
    /// Stop after this many ticks; 0 runs until Ctrl-C
    pub max_ticks: u64,
    pub json_output: bool,
    pub backfill: bool,
}

impl AppCfg {
    pub fn from_config(config: DashboardConfig, max_ticks: u64, json_output: bool, backfill: bool) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            max_ticks,
            json_output,
            backfill,
        })
    }
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    let config = &app_cfg.config;
    info!("Starting Blishko dashboard");
    info!(
        "Assets: {} | tick every {} ms | history {} | sentiment window {}",
        config
            .assets
            .iter()
            .map(|a| format!("{} ({})", a.symbol, a.class))
            .collect::<Vec<_>>()
            .join(", "),
        config.feed.tick_interval_ms,
        config.history.capacity,
        config.sentiment.window
    );

    let binance = BinanceClient::new(
        &config.feed.binance_base_url,
        &config.feed.quote_suffix,
        config.feed.timeout(),
    )
    .context("build Binance client")?
    .with_kline_interval(&config.feed.backfill_interval);

    if config.assets.iter().any(|a| a.class == AssetClass::Crypto) && !binance.is_available().await {
        warn!("⚠️ Crypto prices will show as unavailable until the exchange answers");
    }

    let (simulated, noise) = match config.feed.seed {
        Some(seed) => (SimulatedFeed::seeded(seed), RandNoise::seeded(seed.wrapping_add(1))),
        None => (SimulatedFeed::from_entropy(), RandNoise::from_entropy()),
    };
    let router = FeedRouter::new(Arc::new(binance), Arc::new(simulated), config.feed.timeout());
    let dashboard = Dashboard::new(DashboardSettings::from_config(config), Arc::new(router), noise);

    if app_cfg.backfill {
        let seeded = dashboard.backfill().await;
        info!("✅ Backfill loaded {} samples", seeded);
    }

    run_polling_mode(&app_cfg, &dashboard).await
}

async fn run_polling_mode<N: NoiseSource>(app_cfg: &AppCfg, dashboard: &Dashboard<N>) -> Result<()> {
    info!("Running in polling mode");

    let mut interval = tokio::time::interval(app_cfg.config.feed.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Interrupted, stopping dashboard");
                break;
            }
        }

        let snapshot = dashboard.tick().await;
        render(&snapshot, app_cfg.json_output)?;

        if app_cfg.max_ticks > 0 && snapshot.tick >= app_cfg.max_ticks {
            info!("Reached {} ticks, stopping", app_cfg.max_ticks);
            break;
        }
    }

    Ok(())
}

fn render(snapshot: &DashboardSnapshot, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", snapshot.to_json().context("serialize snapshot")?);
        return Ok(());
    }

    for asset in &snapshot.assets {
        match &asset.error {
            None => info!("  {}", asset.summary()),
            Some(e) => warn!("  {} - {}", asset.summary(), e),
        }
        if asset.significant_move {
            info!("  ⚡ {} moved {:+.2}% since last tick", asset.symbol, asset.change.pct);
        }
    }

    let session = &snapshot.session;
    info!(
        "  Session {:+.2}% ({}/{} symbols) | trust index {:.0}/100",
        session.performance.mean_pct,
        session.performance.contributing(),
        session.performance.basket_size,
        session.trust_index
    );
    if let Some(profit) = &session.profit {
        info!(
            "  💰 {} would now be {} ({}{})",
            format_usd(profit.principal),
            format_usd(profit.final_value),
            if profit.gain >= 0.0 { "+" } else { "" },
            format_usd(profit.gain)
        );
    }
    Ok(())
}
