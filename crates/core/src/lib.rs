pub mod config;
pub mod config_loader;
pub mod error;
pub mod intent;
pub mod sizing;
pub mod traits;

pub use config::{AppConfig, HyperliquidConfig, ServerConfig, WebhookConfig};
pub use config_loader::ConfigLoader;
pub use error::ExecutionError;
pub use intent::{
    ClosedPosition, ExecutionOutcome, FillSummary, OrderDetails, OutcomeStatus, Side, TradeIntent,
};
pub use traits::IntentExecutor;
