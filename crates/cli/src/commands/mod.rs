pub mod close;
pub mod positions;
pub mod serve;
pub mod trade;

use anyhow::Result;
use hyperhook_core::{AppConfig, ConfigLoader};
use hyperhook_hyperliquid::HyperliquidEngine;

/// Load config and build the live engine from the env-provided wallet.
pub fn engine_from_config(config_path: &str) -> Result<(AppConfig, HyperliquidEngine)> {
    let config = ConfigLoader::load(config_path)?;
    let wallet = hyperhook_hyperliquid::wallet::load_wallet_from_env()?;
    let engine = HyperliquidEngine::new(&config.hyperliquid, wallet);
    Ok((config, engine))
}
