use crate::client::HyperliquidClient;
use anyhow::{Context, Result};
use hyperhook_core::Side;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// One entry of the meta universe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    pub name: String,
    pub sz_decimals: u32,
    pub max_leverage: u32,
}

/// Account snapshot from the clearinghouse-state query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    #[serde(default)]
    pub withdrawable: Decimal,
    #[serde(default)]
    pub asset_positions: Vec<AssetPosition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetPosition {
    pub position: Position,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub coin: String,
    /// Signed size: positive long, negative short.
    pub szi: Decimal,
    #[serde(default)]
    pub entry_px: Option<Decimal>,
}

impl Position {
    #[must_use]
    pub fn side(&self) -> Side {
        if self.szi >= Decimal::ZERO {
            Side::Long
        } else {
            Side::Short
        }
    }

    #[must_use]
    pub fn abs_size(&self) -> Decimal {
        self.szi.abs()
    }
}

impl UserState {
    /// The open position for `coin`, skipping dust entries with zero size.
    #[must_use]
    pub fn position_for(&self, coin: &str) -> Option<&Position> {
        self.asset_positions
            .iter()
            .map(|ap| &ap.position)
            .find(|p| p.coin == coin && p.szi != Decimal::ZERO)
    }

    #[must_use]
    pub fn open_positions(&self) -> Vec<&Position> {
        self.asset_positions
            .iter()
            .map(|ap| &ap.position)
            .filter(|p| p.szi != Decimal::ZERO)
            .collect()
    }
}

/// Typed queries against the public `/info` endpoint.
#[derive(Clone)]
pub struct InfoClient {
    client: HyperliquidClient,
}

impl InfoClient {
    #[must_use]
    pub const fn new(client: HyperliquidClient) -> Self {
        Self { client }
    }

    /// Fetch the perp universe (asset names, size precision, max leverage).
    ///
    /// # Errors
    /// Returns error if the request fails or the response shape is unexpected.
    pub async fn meta(&self) -> Result<Vec<AssetMeta>> {
        let response = self.client.info(serde_json::json!({ "type": "meta" })).await?;
        let universe = response
            .get("universe")
            .cloned()
            .context("meta response missing universe")?;

        let assets: Vec<AssetMeta> =
            serde_json::from_value(universe).context("Failed to parse meta universe")?;
        Ok(assets)
    }

    /// Fetch balances and open positions for a wallet address.
    ///
    /// # Errors
    /// Returns error if the request fails or the response shape is unexpected.
    pub async fn user_state(&self, address: &str) -> Result<UserState> {
        let response = self
            .client
            .info(serde_json::json!({ "type": "clearinghouseState", "user": address }))
            .await?;

        serde_json::from_value(response).context("Failed to parse user state")
    }

    /// Fetch mid prices for every asset.
    ///
    /// # Errors
    /// Returns error if the request fails or the response shape is unexpected.
    pub async fn all_mids(&self) -> Result<HashMap<String, Decimal>> {
        let response = self.client.info(serde_json::json!({ "type": "allMids" })).await?;

        serde_json::from_value(response).context("Failed to parse all mids")
    }
}
