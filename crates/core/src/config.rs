use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    pub hyperliquid: HyperliquidConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret carried in the alert payload. Usually supplied via the
    /// `APP_WEBHOOK__PASSWORD` env var rather than the config file.
    pub password: String,
    /// Source IPs allowed to deliver webhooks.
    pub allowed_ips: Vec<String>,
    /// Disable for local/ngrok testing where the peer address is not
    /// TradingView's egress.
    pub enforce_ip_allowlist: bool,
    /// Percent of withdrawable balance used when the alert omits
    /// `amountPercent`.
    pub default_percent: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HyperliquidConfig {
    pub api_url: String,
    /// Max slippage for market orders, in basis points.
    pub slippage_bps: u32,
}

/// TradingView's published webhook egress addresses.
pub const TRADINGVIEW_WEBHOOK_IPS: [&str; 4] = [
    "52.89.214.238",
    "34.212.75.30",
    "54.218.53.128",
    "52.32.178.7",
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            webhook: WebhookConfig {
                password: String::new(),
                allowed_ips: TRADINGVIEW_WEBHOOK_IPS
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                enforce_ip_allowlist: true,
                default_percent: 5,
            },
            hyperliquid: HyperliquidConfig {
                api_url: "https://api.hyperliquid.xyz".to_string(),
                slippage_bps: 100,
            },
        }
    }
}
