use super::engine_from_config;
use anyhow::Result;
use hyperhook_core::{IntentExecutor, TradeIntent};

/// Closes a single asset's position, or every open position.
pub async fn run(config_path: &str, ticker: Option<String>) -> Result<()> {
    let (_config, engine) = engine_from_config(config_path)?;

    let intent = match ticker {
        Some(ticker) => TradeIntent::Close { ticker },
        None => TradeIntent::CloseAll,
    };

    let outcome = engine.execute(intent).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if outcome.is_error() {
        anyhow::bail!("Close failed: {}", outcome.message);
    }
    Ok(())
}
