use super::engine_from_config;
use anyhow::Result;
use hyperhook_web_api::{handlers::AppState, ApiServer, WebhookAuth};
use std::sync::Arc;

/// Runs the webhook server with the live trading engine.
pub async fn run(config_path: &str) -> Result<()> {
    let (config, engine) = engine_from_config(config_path)?;

    if config.webhook.password.is_empty() {
        anyhow::bail!(
            "Webhook password not configured. Set APP_WEBHOOK__PASSWORD or webhook.password in {config_path}"
        );
    }

    tracing::info!(address = engine.address(), "Trading wallet loaded");
    if !config.webhook.enforce_ip_allowlist {
        tracing::warn!("Source IP allowlist disabled, any host can deliver webhooks");
    }

    let state = AppState {
        auth: WebhookAuth::new(&config.webhook),
        executor: Arc::new(engine),
        default_percent: config.webhook.default_percent,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    ApiServer::new(state).serve(&addr).await
}
