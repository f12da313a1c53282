pub mod client;
pub mod engine;
pub mod execution;
pub mod info;
pub mod signing;
pub mod wallet;

pub use client::HyperliquidClient;
pub use engine::{ExchangeApi, HyperliquidEngine, LiveExchange};
pub use info::InfoClient;
