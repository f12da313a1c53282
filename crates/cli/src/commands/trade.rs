use super::engine_from_config;
use anyhow::Result;
use clap::Args;
use hyperhook_core::{IntentExecutor, Side, TradeIntent};

/// Arguments for the trade command.
#[derive(Args, Debug)]
pub struct TradeArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Direction: long or short
    #[arg(long)]
    pub action: String,

    /// Asset to trade (e.g. "BTC")
    #[arg(long)]
    pub ticker: String,

    /// Percent of withdrawable balance to commit (1-100)
    #[arg(long)]
    pub percent: Option<u8>,
}

/// Places a manual intent through the same path webhooks take.
pub async fn run(args: TradeArgs) -> Result<()> {
    let (config, engine) = engine_from_config(&args.config)?;

    let side = match args.action.to_lowercase().as_str() {
        "long" => Side::Long,
        "short" => Side::Short,
        other => anyhow::bail!("Unknown action: {other} (expected long or short)"),
    };

    let intent = TradeIntent::Open {
        ticker: args.ticker,
        side,
        percent: args.percent.unwrap_or(config.webhook.default_percent),
    };

    let outcome = engine.execute(intent).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if outcome.is_error() {
        anyhow::bail!("Trade failed: {}", outcome.message);
    }
    Ok(())
}
