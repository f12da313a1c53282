use anyhow::{Context, Result};
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate-limited HTTP client for the Hyperliquid REST API. Both the public
/// `/info` endpoint and the signed `/exchange` endpoint are plain JSON POSTs.
#[derive(Clone)]
pub struct HyperliquidClient {
    http_client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter<governor::state::direct::NotKeyed, InMemoryState, DefaultClock>>,
}

impl HyperliquidClient {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        // 1200 requests per minute = 20 per second
        let quota = Quota::per_second(NonZeroU32::new(20).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            http_client: Client::new(),
            base_url,
            rate_limiter,
        }
    }

    /// POST a query to `/info`.
    ///
    /// # Errors
    /// Returns error on transport failure or a non-2xx status.
    pub async fn info(&self, body: serde_json::Value) -> Result<serde_json::Value> {
        self.post("/info", body).await
    }

    /// POST a signed action to `/exchange`.
    ///
    /// # Errors
    /// Returns error on transport failure or a non-2xx status.
    pub async fn exchange(&self, body: serde_json::Value) -> Result<serde_json::Value> {
        self.post("/exchange", body).await
    }

    async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {endpoint} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Hyperliquid {endpoint} returned HTTP {status}: {text}");
        }

        let json = response.json().await.context("Invalid JSON response")?;
        Ok(json)
    }
}
