//! Forkooor
//!
//! HTTP backend for testing DeFi positions on forked networks:
//! - Arbitrary ERC-20 and ETH balances through direct storage writes
//! - Chain time control (time travel, fixed timestamps)
//! - Lending position readers (Aave V3, Spark, Compound V3, Morpho Blue, Liquity V1/V2,
//!   CurveUSD, Maker, Fluid)
//! - Automation strategy subscriptions from smart wallets

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forkooor_api::{serve, AppState};
use forkooor_core::load_from_env;

/// Environment variable names.
mod env {
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

const DEFAULT_FILTER: &str = "info,forkooor_core=debug,forkooor_chain=debug,forkooor_api=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting forkooor");

    let config = load_from_env().context("Failed to load configuration")?;
    config.service.log_config();
    info!(
        chains = config.chains.chain_ids().count(),
        slots = config.slots.len(),
        bundles = config.bundles.len(),
        "Configuration loaded"
    );

    let bind = config.service.server.bind.clone();
    serve(AppState::new(config), &bind).await
}

/// Human-readable logs by default, JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(env::LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
