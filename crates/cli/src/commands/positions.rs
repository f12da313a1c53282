use super::engine_from_config;
use anyhow::Result;

/// Prints the account's withdrawable balance and open positions.
pub async fn run(config_path: &str) -> Result<()> {
    let (_config, engine) = engine_from_config(config_path)?;

    let state = engine.account().await?;

    println!("Wallet:       {}", engine.address());
    println!("Withdrawable: {} USDC", state.withdrawable);

    let positions = state.open_positions();
    if positions.is_empty() {
        println!("No open positions.");
        return Ok(());
    }

    println!("\nOpen positions:");
    for position in positions {
        let entry = position
            .entry_px
            .map_or_else(|| "-".to_string(), |px| px.to_string());
        println!(
            "  {:<8} {:<5} size {:>12}  entry {}",
            position.coin,
            position.side().as_str(),
            position.abs_size(),
            entry
        );
    }

    Ok(())
}
