use crate::client::HyperliquidClient;
use crate::signing::{sign_action, signature_to_hex, NonceSource};
use anyhow::{Context, Result};
use ethers::signers::LocalWallet;
use hyperhook_core::ExecutionError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::json;

/// Fill summary extracted from an order response. IOC orders either fill
/// (possibly partially) or cancel; `filled` is `None` when nothing crossed.
#[derive(Debug, Clone)]
pub struct OrderFill {
    pub total_size: Option<Decimal>,
    pub avg_price: Option<Decimal>,
    pub order_id: Option<u64>,
}

/// Places signed actions against `/exchange`. Market orders are expressed as
/// aggressive IOC limit orders, which is how the exchange itself implements
/// them.
pub struct OrderGateway {
    client: HyperliquidClient,
    wallet: LocalWallet,
    nonces: NonceSource,
}

impl OrderGateway {
    #[must_use]
    pub fn new(client: HyperliquidClient, wallet: LocalWallet) -> Self {
        Self {
            client,
            wallet,
            nonces: NonceSource::new(),
        }
    }

    /// Set cross-margin leverage for an asset.
    ///
    /// # Errors
    /// Returns error if the request fails or the exchange rejects the update.
    pub async fn update_leverage(&self, asset_index: u32, leverage: u32) -> Result<()> {
        let action = json!({
            "type": "updateLeverage",
            "asset": asset_index,
            "isCross": true,
            "leverage": leverage,
        });

        let response = self.send_signed(action).await?;
        if response.get("status").and_then(|s| s.as_str()) != Some("ok") {
            anyhow::bail!("Leverage update rejected: {response}");
        }
        Ok(())
    }

    /// Submit an IOC limit order at `limit_price`.
    ///
    /// # Errors
    /// Returns error on transport failure, or if the exchange reports an
    /// error for the order.
    pub async fn market_order(
        &self,
        asset_index: u32,
        is_buy: bool,
        size: Decimal,
        limit_price: Decimal,
        reduce_only: bool,
    ) -> Result<OrderFill> {
        let action = json!({
            "type": "order",
            "orders": [{
                "a": asset_index,
                "b": is_buy,
                "p": limit_price.to_string(),
                "s": size.to_string(),
                "r": reduce_only,
                "t": { "limit": { "tif": "Ioc" } },
            }],
            "grouping": "na",
        });

        let response = self.send_signed(action).await?;
        parse_order_response(&response)
    }

    async fn send_signed(&self, action: serde_json::Value) -> Result<serde_json::Value> {
        let nonce = self.nonces.next_nonce();
        let signature = sign_action(&self.wallet, &action, nonce).await?;

        let body = json!({
            "action": action,
            "nonce": nonce,
            "signature": signature_to_hex(&signature),
        });

        self.client.exchange(body).await
    }
}

/// Walk the order response for the first status entry: an `error` there is a
/// rejection even when the outer status is "ok".
pub fn parse_order_response(response: &serde_json::Value) -> Result<OrderFill> {
    let status = response
        .get("status")
        .and_then(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing status in order response"))?;

    if status != "ok" {
        let error = response
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("Unknown error");
        return Err(ExecutionError::Exchange(error.to_string()).into());
    }

    let statuses = response
        .get("response")
        .and_then(|r| r.get("data"))
        .and_then(|d| d.get("statuses"))
        .and_then(|s| s.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid order response format"))?;

    let first = statuses
        .first()
        .ok_or_else(|| anyhow::anyhow!("No order status in response"))?;

    if let Some(error) = first.get("error").and_then(|e| e.as_str()) {
        return Err(ExecutionError::Exchange(error.to_string()).into());
    }

    let filled = first.get("filled");
    let total_size = filled
        .and_then(|f| f.get("totalSz"))
        .and_then(|s| s.as_str())
        .and_then(|s| Decimal::from_str_exact(s).ok());
    let avg_price = filled
        .and_then(|f| f.get("avgPx"))
        .and_then(|p| p.as_str())
        .and_then(|p| Decimal::from_str_exact(p).ok());
    let order_id = filled
        .and_then(|f| f.get("oid"))
        .and_then(serde_json::Value::as_u64);

    Ok(OrderFill {
        total_size,
        avg_price,
        order_id,
    })
}

/// Price a market order `slippage_bps` through the mid, then round to what
/// the exchange accepts: 5 significant figures, at most `6 - szDecimals`
/// decimal places.
pub fn aggressive_price(
    mid: Decimal,
    is_buy: bool,
    slippage_bps: u32,
    sz_decimals: u32,
) -> Result<Decimal> {
    let bps = Decimal::from(slippage_bps) / Decimal::from(10_000u32);
    let raw = if is_buy {
        mid * (Decimal::ONE + bps)
    } else {
        mid * (Decimal::ONE - bps)
    };

    round_price(raw, sz_decimals)
}

/// Round a price to 5 significant figures and at most `6 - szDecimals`
/// decimals.
pub fn round_price(price: Decimal, sz_decimals: u32) -> Result<Decimal> {
    let max_decimals = 6u32.saturating_sub(sz_decimals);

    let float = price
        .to_f64()
        .context("Price not representable as float")?;
    let five_sig = format!("{float:.4e}")
        .parse::<f64>()
        .context("Failed to round price")?;
    let rounded = Decimal::from_f64(five_sig).context("Rounded price out of range")?;

    Ok(rounded.round_dp(max_decimals).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_rounds_to_five_significant_figures() {
        assert_eq!(round_price(dec!(97123.456), 5).unwrap(), dec!(97123));
        assert_eq!(round_price(dec!(1234.5678), 4).unwrap(), dec!(1234.6));
        assert_eq!(round_price(dec!(0.0123456), 0).unwrap(), dec!(0.012346));
    }

    #[test]
    fn price_respects_decimal_cap() {
        // 6 - szDecimals caps the decimals even under 5 sig figs
        assert_eq!(round_price(dec!(0.123456), 2).unwrap(), dec!(0.1235));
    }

    #[test]
    fn aggressive_price_applies_slippage_both_ways() {
        let buy = aggressive_price(dec!(100), true, 100, 2).unwrap();
        let sell = aggressive_price(dec!(100), false, 100, 2).unwrap();
        assert_eq!(buy, dec!(101));
        assert_eq!(sell, dec!(99));
    }

    #[test]
    fn parses_filled_order() {
        let response = serde_json::json!({
            "status": "ok",
            "response": {
                "type": "order",
                "data": { "statuses": [
                    { "filled": { "totalSz": "0.25", "avgPx": "97120.0", "oid": 7654321 } }
                ]}
            }
        });
        let fill = parse_order_response(&response).unwrap();
        assert_eq!(fill.total_size, Some(dec!(0.25)));
        assert_eq!(fill.avg_price, Some(dec!(97120.0)));
        assert_eq!(fill.order_id, Some(7_654_321));
    }

    #[test]
    fn status_level_error_is_a_rejection() {
        let response = serde_json::json!({
            "status": "ok",
            "response": {
                "type": "order",
                "data": { "statuses": [ { "error": "Insufficient margin" } ] }
            }
        });
        let err = parse_order_response(&response).unwrap_err();
        assert!(err.to_string().contains("Insufficient margin"));
    }

    #[test]
    fn outer_error_is_a_rejection() {
        let response = serde_json::json!({
            "status": "err",
            "response": "Must deposit before trading"
        });
        assert!(parse_order_response(&response).is_err());
    }
}
