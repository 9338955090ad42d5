//! # sb-runner
//!
//! Main entry point for the signal bridge.
//!
//! Reads the environment (optionally seeded from a dotenv file), connects the
//! Binance futures client, and serves the webhook until Ctrl+C.
//!
//! # Usage
//!
//! ```bash
//! sb-runner --log-level info --log-dir ./logs --port 3000
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sb_core::config::AppConfig;
use sb_core::logging::{LogOptions, init_logging};
use sb_hook::AppState;
use sb_td::binance::BinanceFutures;
use sb_td::executor::Executor;
use tracing::info;

/// Webhook → Binance futures market-order bridge.
#[derive(Parser)]
#[command(name = "sb-runner", about = "Webhook to Binance futures market-order bridge")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,

    /// Listening port (overrides `PORT`).
    #[arg(short, long)]
    port: Option<u16>,

    /// Alternate dotenv file (default: `.env` if present).
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    init_logging(&LogOptions {
        level: cli.log_level.clone(),
        dir: cli.log_dir.clone(),
        file_prefix: "sb-runner".into(),
    });
    info!("sb-runner starting — log_level={}", cli.log_level);

    // 2. Load configuration
    let config = AppConfig::from_env(cli.env_file.as_deref()).context("failed to load configuration")?;
    let port = cli.port.unwrap_or(config.port);
    let notional = config.sizing.target_notional().context("invalid sizing configuration")?;
    info!(
        "config loaded — margin={}, leverage={}, notional={}, binance={:?}",
        config.sizing.margin_size,
        config.sizing.leverage,
        notional,
        config.binance,
    );

    // 3. Build the order pipeline
    let exchange = BinanceFutures::new(&config.binance)?;
    let executor = Executor::new(Arc::new(exchange), config.sizing);

    // 4. Serve until Ctrl+C
    sb_hook::serve(port, AppState::new(executor)).await?;

    info!("sb-runner stopped — goodbye");
    Ok(())
}
