use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hyperhook")]
#[command(about = "TradingView webhook bridge for Hyperliquid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Serve {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Place a manual long/short intent through the same engine as webhooks
    Trade(commands::trade::TradeArgs),
    /// Close one asset's position, or all positions
    Close {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Asset to close (e.g. "BTC"); omit to close everything
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Show withdrawable balance and open positions
    Positions {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Serve { config } => commands::serve::run(&config).await,
        Commands::Trade(args) => commands::trade::run(args).await,
        Commands::Close { config, ticker } => commands::close::run(&config, ticker).await,
        Commands::Positions { config } => commands::positions::run(&config).await,
    }
}
