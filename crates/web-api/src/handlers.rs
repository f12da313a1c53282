use crate::auth::WebhookAuth;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use hyperhook_core::{IntentExecutor, Side, TradeIntent};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: WebhookAuth,
    pub executor: Arc<dyn IntentExecutor>,
    pub default_percent: u8,
}

/// TradingView alert body. The alert template embeds the shared password and
/// the intent fields.
#[derive(Debug, Deserialize)]
pub struct AlertPayload {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(rename = "amountPercent")]
    pub amount_percent: Option<u8>,
}

fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "status": "error", "message": message })
}

/// Source address of the webhook. Behind a proxy or gateway the socket peer
/// is the proxy, so the first `X-Forwarded-For` hop wins when present.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> std::net::IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| peer.ip())
}

/// Handles `POST /webhook`: authenticate, decode the intent, execute it.
pub async fn webhook(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    // Malformed JSON is a 400 even from an unauthorized address, then IP,
    // then password.
    let Ok(payload) = serde_json::from_str::<AlertPayload>(&body) else {
        tracing::error!("Failed to parse request body as JSON");
        return (
            StatusCode::BAD_REQUEST,
            Json(error_body("Invalid JSON in request body")),
        );
    };

    let source_ip = client_ip(&headers, peer);

    if !state.auth.ip_allowed(source_ip) {
        tracing::error!(%source_ip, "Request from unauthorized IP address");
        return (
            StatusCode::FORBIDDEN,
            Json(error_body("Unauthorized source IP")),
        );
    }

    if !state
        .auth
        .verify_password(payload.password.as_deref().unwrap_or(""))
    {
        tracing::error!("Invalid webhook password");
        return (
            StatusCode::FORBIDDEN,
            Json(error_body("Invalid webhook password")),
        );
    }

    let action = payload.action.to_lowercase();
    let percent = payload.amount_percent.unwrap_or(state.default_percent);

    let intent = match action.as_str() {
        "long" => TradeIntent::Open {
            ticker: payload.ticker,
            side: Side::Long,
            percent,
        },
        "short" => TradeIntent::Open {
            ticker: payload.ticker,
            side: Side::Short,
            percent,
        },
        "close" => TradeIntent::CloseAll,
        other => {
            tracing::error!("Unknown action: {other}");
            return (
                StatusCode::BAD_REQUEST,
                Json(error_body(&format!("Unknown action: {other}"))),
            );
        }
    };

    tracing::info!(%source_ip, action, "Processing webhook");

    match state.executor.execute(intent).await {
        Ok(outcome) => {
            let status = if outcome.is_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::OK
            };
            let body = serde_json::to_value(&outcome)
                .unwrap_or_else(|_| error_body("Failed to serialize outcome"));
            (status, Json(body))
        }
        Err(e) => {
            tracing::error!("Webhook execution failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_body(&format!("{e:#}"))),
            )
        }
    }
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
