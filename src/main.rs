mod app;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use blishko::shared::config::ConfigLoader;
use blishko::shared::types::Symbol;

#[derive(Parser, Debug)]
#[command(version, about = "Live market dashboard: rolling prices, sentiment index and session performance")]
struct Args {
    /// Path to config file (defaults to ./Config.toml when present)
    #[arg(long)]
    config: Option<String>,

    /// Delay between ticks in milliseconds (overrides config)
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Samples kept per symbol (overrides config)
    #[arg(long)]
    capacity: Option<usize>,

    /// Symbols to track, comma-separated (must exist in config)
    #[arg(long)]
    symbols: Option<String>,

    /// Stop after N ticks; 0 runs until interrupted
    #[arg(long, default_value = "0")]
    ticks: u64,

    /// Seed for simulated quotes and sentiment noise (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Principal for the profit simulator (overrides config)
    #[arg(long)]
    principal: Option<f64>,

    /// Print each snapshot as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Skip loading recent history at startup
    #[arg(long)]
    no_backfill: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    // Priority: CLI args > Config file > Defaults
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_or_default()?,
    };

    if let Some(tick_interval_ms) = args.tick_interval_ms {
        config.feed.tick_interval_ms = tick_interval_ms;
    }
    if let Some(capacity) = args.capacity {
        config.history.capacity = capacity;
    }
    if let Some(seed) = args.seed {
        config.feed.seed = Some(seed);
    }
    if let Some(principal) = args.principal {
        config.session.principal = Some(principal);
    }
    if let Some(symbols) = args.symbols {
        let symbols: Vec<Symbol> = symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Symbol::from)
            .collect();
        config.retain_symbols(&symbols)?;
    }

    let app_cfg = app::AppCfg::from_config(config, args.ticks, args.json, !args.no_backfill)?;
    app::run(app_cfg).await
}
