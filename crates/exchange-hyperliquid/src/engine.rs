use crate::client::HyperliquidClient;
use crate::execution::{aggressive_price, OrderFill, OrderGateway};
use crate::info::{AssetMeta, InfoClient, Position, UserState};
use crate::wallet::wallet_address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::signers::LocalWallet;
use hyperhook_core::{
    sizing, ClosedPosition, ExecutionError, ExecutionOutcome, FillSummary, HyperliquidConfig,
    IntentExecutor, OrderDetails, OutcomeStatus, Side, TradeIntent,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The exchange calls the engine needs. Splitting this from the engine keeps
/// the adjustment logic testable without a live endpoint.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    async fn meta(&self) -> Result<Vec<AssetMeta>>;
    async fn user_state(&self, address: &str) -> Result<UserState>;
    async fn all_mids(&self) -> Result<HashMap<String, Decimal>>;
    async fn update_leverage(&self, asset_index: u32, leverage: u32) -> Result<()>;
    async fn market_order(
        &self,
        asset_index: u32,
        is_buy: bool,
        size: Decimal,
        limit_price: Decimal,
        reduce_only: bool,
    ) -> Result<OrderFill>;
}

/// Production [`ExchangeApi`]: info queries plus signed orders against the
/// real REST endpoints.
pub struct LiveExchange {
    info: InfoClient,
    gateway: OrderGateway,
}

impl LiveExchange {
    #[must_use]
    pub fn new(client: HyperliquidClient, wallet: LocalWallet) -> Self {
        Self {
            info: InfoClient::new(client.clone()),
            gateway: OrderGateway::new(client, wallet),
        }
    }
}

#[async_trait]
impl ExchangeApi for LiveExchange {
    async fn meta(&self) -> Result<Vec<AssetMeta>> {
        self.info.meta().await
    }

    async fn user_state(&self, address: &str) -> Result<UserState> {
        self.info.user_state(address).await
    }

    async fn all_mids(&self) -> Result<HashMap<String, Decimal>> {
        self.info.all_mids().await
    }

    async fn update_leverage(&self, asset_index: u32, leverage: u32) -> Result<()> {
        self.gateway.update_leverage(asset_index, leverage).await
    }

    async fn market_order(
        &self,
        asset_index: u32,
        is_buy: bool,
        size: Decimal,
        limit_price: Decimal,
        reduce_only: bool,
    ) -> Result<OrderFill> {
        self.gateway
            .market_order(asset_index, is_buy, size, limit_price, reduce_only)
            .await
    }
}

/// How an open intent reconciles against the existing position.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AdjustPlan {
    /// No position: open the full target size.
    Open(Decimal),
    /// Same-direction position smaller than target: buy/sell the difference.
    Add(Decimal),
    /// Same-direction position larger than target: reduce-only the difference.
    Reduce(Decimal),
    /// Opposite-direction position: flatten it, then re-size and open.
    ReverseThenOpen,
    /// Position already matches the target within size precision.
    AlreadyAtTarget,
}

fn plan_adjustment(
    existing: Option<(Side, Decimal)>,
    side: Side,
    target: Decimal,
    sz_decimals: u32,
) -> AdjustPlan {
    let Some((current_side, current_size)) = existing else {
        return AdjustPlan::Open(target);
    };

    if current_side != side {
        return AdjustPlan::ReverseThenOpen;
    }

    let delta = (target - current_size).abs().trunc_with_scale(sz_decimals).normalize();
    if delta == Decimal::ZERO {
        AdjustPlan::AlreadyAtTarget
    } else if target > current_size {
        AdjustPlan::Add(delta)
    } else {
        AdjustPlan::Reduce(delta)
    }
}

/// Live trading engine: translates intents into Hyperliquid orders.
pub struct HyperliquidEngine<A = LiveExchange> {
    api: A,
    address: String,
    slippage_bps: u32,
}

impl HyperliquidEngine {
    #[must_use]
    pub fn new(config: &HyperliquidConfig, wallet: LocalWallet) -> Self {
        let client = HyperliquidClient::new(config.api_url.clone());
        let address = wallet_address(&wallet);

        Self {
            api: LiveExchange::new(client, wallet),
            address,
            slippage_bps: config.slippage_bps,
        }
    }
}

impl<A: ExchangeApi> HyperliquidEngine<A> {
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Account snapshot for operator commands.
    ///
    /// # Errors
    /// Returns error if the info query fails.
    pub async fn account(&self) -> Result<UserState> {
        self.api.user_state(&self.address).await
    }

    async fn open_position(&self, ticker: &str, side: Side, percent: u8) -> Result<ExecutionOutcome> {
        // Reject bad input before touching the exchange.
        if !(1..=100).contains(&percent) {
            return Ok(ExecutionOutcome::error(
                ExecutionError::InvalidPercent(percent).to_string(),
            ));
        }

        let ticker = ticker.to_uppercase();

        let universe = self.api.meta().await?;
        let Some((asset_index, asset)) = find_asset(&universe, &ticker) else {
            return Ok(ExecutionOutcome::error(
                ExecutionError::UnknownAsset(ticker).to_string(),
            ));
        };

        let mids = self.api.all_mids().await?;
        let Some(mid) = mids.get(&ticker).copied().filter(|m| *m > Decimal::ZERO) else {
            return Ok(ExecutionOutcome::error(
                ExecutionError::PriceUnavailable(ticker).to_string(),
            ));
        };

        let mut state = self.api.user_state(&self.address).await?;
        let leverage = asset.max_leverage;

        let mut target = match sizing::order_size(
            state.withdrawable,
            percent,
            leverage,
            mid,
            asset.sz_decimals,
        ) {
            Ok(size) => size,
            Err(e) => return Ok(ExecutionOutcome::error(e.to_string())),
        };

        // The exchange still fills at max leverage without this, so a
        // rejection here is not fatal (matches the original bridge).
        if let Err(e) = self.api.update_leverage(asset_index, leverage).await {
            tracing::warn!(%ticker, leverage, "Leverage update failed: {e:#}");
        }

        let existing = state
            .position_for(&ticker)
            .map(|p| (p.side(), p.abs_size()));
        let plan = plan_adjustment(existing, side, target, asset.sz_decimals);
        tracing::info!(%ticker, side = side.as_str(), %target, ?plan, "Planned adjustment");

        let (order_size, reduce_only, order_is_buy, verb) = match plan {
            AdjustPlan::AlreadyAtTarget => {
                return Ok(ExecutionOutcome::success(format!(
                    "{ticker} {} position already at target size",
                    side.as_str()
                )));
            }
            AdjustPlan::Open(size) => (size, false, side.is_buy(), "opened"),
            AdjustPlan::Add(delta) => (delta, false, side.is_buy(), "added to"),
            AdjustPlan::Reduce(delta) => (delta, true, !side.is_buy(), "reduced"),
            AdjustPlan::ReverseThenOpen => {
                let position = state
                    .position_for(&ticker)
                    .context("Position vanished during reversal")?
                    .clone();
                tracing::info!(
                    %ticker,
                    "Existing position in opposite direction, closing it first"
                );
                if let Err(e) = self.close_position(&position, &universe, &mids).await {
                    return Ok(ExecutionOutcome::error(format!(
                        "Failed to close opposite position: {e:#}"
                    )));
                }

                // Re-size from the post-close balance.
                state = self.api.user_state(&self.address).await?;
                target = match sizing::order_size(
                    state.withdrawable,
                    percent,
                    leverage,
                    mid,
                    asset.sz_decimals,
                ) {
                    Ok(size) => size,
                    Err(e) => return Ok(ExecutionOutcome::error(e.to_string())),
                };
                (target, false, side.is_buy(), "opened")
            }
        };

        let limit_price = aggressive_price(mid, order_is_buy, self.slippage_bps, asset.sz_decimals)?;
        let fill = match self
            .api
            .market_order(asset_index, order_is_buy, order_size, limit_price, reduce_only)
            .await
        {
            Ok(fill) => fill,
            Err(e) => {
                tracing::error!(%ticker, "Order failed: {e:#}");
                return Ok(ExecutionOutcome::error(format!(
                    "Failed to open position: {e:#}"
                )));
            }
        };

        let mut outcome = ExecutionOutcome::success(format!(
            "Successfully {verb} {} position for {ticker}",
            side.as_str()
        ));
        outcome.details = Some(OrderDetails {
            asset: ticker,
            side,
            size: order_size,
            leverage,
            usd_value: order_size * mid,
        });
        outcome.filled = fill_summary(&fill);

        Ok(outcome)
    }

    /// Reduce-only market order flattening `position`.
    async fn close_position(
        &self,
        position: &Position,
        universe: &[AssetMeta],
        mids: &HashMap<String, Decimal>,
    ) -> Result<OrderFill> {
        let (asset_index, asset) = find_asset(universe, &position.coin)
            .with_context(|| format!("Asset {} not in universe", position.coin))?;
        let mid = mids
            .get(&position.coin)
            .copied()
            .filter(|m| *m > Decimal::ZERO)
            .with_context(|| format!("No mid price for {}", position.coin))?;

        // Closing a long sells, closing a short buys.
        let is_buy = position.side() == Side::Short;
        let limit_price = aggressive_price(mid, is_buy, self.slippage_bps, asset.sz_decimals)?;

        self.api
            .market_order(asset_index, is_buy, position.abs_size(), limit_price, true)
            .await
    }

    async fn close_asset(&self, ticker: &str) -> Result<ExecutionOutcome> {
        let ticker = ticker.to_uppercase();
        let state = self.api.user_state(&self.address).await?;

        let Some(position) = state.position_for(&ticker).cloned() else {
            return Ok(ExecutionOutcome::success(format!(
                "No open position found for {ticker} to close"
            )));
        };

        match self.close_single(&position).await {
            Ok(()) => Ok(ExecutionOutcome::success(format!(
                "Successfully closed {ticker} position"
            ))),
            Err(e) => {
                tracing::error!(%ticker, "Close failed: {e:#}");
                Ok(ExecutionOutcome::error(format!(
                    "Failed to close {ticker} position: {e:#}"
                )))
            }
        }
    }

    async fn close_single(&self, position: &Position) -> Result<()> {
        let universe = self.api.meta().await?;
        let mids = self.api.all_mids().await?;
        self.close_position(position, &universe, &mids).await?;
        Ok(())
    }

    async fn close_all(&self) -> Result<ExecutionOutcome> {
        let state = self.api.user_state(&self.address).await?;
        let positions: Vec<Position> = state.open_positions().into_iter().cloned().collect();

        if positions.is_empty() {
            return Ok(ExecutionOutcome::success("No open positions to close"));
        }

        tracing::info!("Closing {} positions", positions.len());
        let universe = self.api.meta().await?;
        let mids = self.api.all_mids().await?;

        let mut closed = Vec::new();
        let mut failed = Vec::new();

        for position in &positions {
            let entry = ClosedPosition {
                asset: position.coin.clone(),
                size: position.abs_size(),
                side: position.side(),
                error: None,
            };

            match self.close_position(position, &universe, &mids).await {
                Ok(_) => {
                    tracing::info!(coin = %position.coin, "Closed position");
                    closed.push(entry);
                }
                Err(e) => {
                    tracing::error!(coin = %position.coin, "Failed to close position: {e:#}");
                    failed.push(ClosedPosition {
                        error: Some(format!("{e:#}")),
                        ..entry
                    });
                }
            }
        }

        let mut message = format!("Closed {} positions", closed.len());
        if !failed.is_empty() {
            message.push_str(&format!(", {} failed", failed.len()));
        }

        let mut outcome = ExecutionOutcome {
            status: if failed.is_empty() {
                OutcomeStatus::Success
            } else {
                OutcomeStatus::Partial
            },
            message,
            details: None,
            filled: None,
            closed_positions: closed,
            failed_positions: failed,
        };

        // all closes failing is an error, not a partial success
        if outcome.closed_positions.is_empty() && !outcome.failed_positions.is_empty() {
            outcome.status = OutcomeStatus::Error;
        }

        Ok(outcome)
    }
}

#[async_trait]
impl<A: ExchangeApi> IntentExecutor for HyperliquidEngine<A> {
    async fn execute(&self, intent: TradeIntent) -> Result<ExecutionOutcome> {
        let result = match &intent {
            TradeIntent::Open {
                ticker,
                side,
                percent,
            } => self.open_position(ticker, *side, *percent).await,
            TradeIntent::Close { ticker } => self.close_asset(ticker).await,
            TradeIntent::CloseAll => self.close_all().await,
        };

        // Transport failures become error outcomes too: the webhook caller
        // can only act on the JSON body.
        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(?intent, "Intent failed: {e:#}");
                Ok(ExecutionOutcome::error(format!("{e:#}")))
            }
        }
    }
}

fn find_asset<'a>(universe: &'a [AssetMeta], ticker: &str) -> Option<(u32, &'a AssetMeta)> {
    universe
        .iter()
        .enumerate()
        .find(|(_, a)| a.name == ticker)
        .and_then(|(i, a)| Some((u32::try_from(i).ok()?, a)))
}

fn fill_summary(fill: &OrderFill) -> Option<FillSummary> {
    Some(FillSummary {
        size: fill.total_size?,
        average_price: fill.avg_price?,
        order_id: fill.order_id.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::AssetPosition;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[test]
    fn no_position_opens_full_size() {
        let plan = plan_adjustment(None, Side::Long, dec!(2.5), 4);
        assert_eq!(plan, AdjustPlan::Open(dec!(2.5)));
    }

    #[test]
    fn smaller_same_direction_position_adds() {
        let plan = plan_adjustment(Some((Side::Long, dec!(1.0))), Side::Long, dec!(2.5), 4);
        assert_eq!(plan, AdjustPlan::Add(dec!(1.5)));
    }

    #[test]
    fn larger_same_direction_position_reduces() {
        let plan = plan_adjustment(Some((Side::Short, dec!(4.0))), Side::Short, dec!(2.5), 4);
        assert_eq!(plan, AdjustPlan::Reduce(dec!(1.5)));
    }

    #[test]
    fn opposite_position_reverses() {
        let plan = plan_adjustment(Some((Side::Short, dec!(1.0))), Side::Long, dec!(2.5), 4);
        assert_eq!(plan, AdjustPlan::ReverseThenOpen);
    }

    #[test]
    fn sub_precision_delta_is_a_noop() {
        // 0.00004 difference truncates to zero at 4 decimals
        let plan = plan_adjustment(Some((Side::Long, dec!(1.00001))), Side::Long, dec!(1.00005), 4);
        assert_eq!(plan, AdjustPlan::AlreadyAtTarget);
    }

    #[test]
    fn finds_asset_index_in_universe() {
        let universe = vec![
            AssetMeta {
                name: "BTC".to_string(),
                sz_decimals: 5,
                max_leverage: 50,
            },
            AssetMeta {
                name: "ETH".to_string(),
                sz_decimals: 4,
                max_leverage: 50,
            },
        ];
        let (index, asset) = find_asset(&universe, "ETH").unwrap();
        assert_eq!(index, 1);
        assert_eq!(asset.sz_decimals, 4);
        assert!(find_asset(&universe, "DOGE").is_none());
    }

    #[derive(Debug)]
    struct PlacedOrder {
        asset_index: u32,
        is_buy: bool,
        size: Decimal,
        reduce_only: bool,
    }

    /// Canned exchange: fixed universe and mids, a queue of account
    /// snapshots, and a record of every order and leverage call.
    struct ScriptedExchange {
        universe: Vec<AssetMeta>,
        mids: HashMap<String, Decimal>,
        states: Mutex<VecDeque<UserState>>,
        fail_leverage: bool,
        leverage_calls: Mutex<Vec<(u32, u32)>>,
        orders: Mutex<Vec<PlacedOrder>>,
    }

    impl ScriptedExchange {
        fn new(states: Vec<UserState>) -> Self {
            Self {
                universe: vec![AssetMeta {
                    name: "BTC".to_string(),
                    sz_decimals: 4,
                    max_leverage: 10,
                }],
                mids: HashMap::from([("BTC".to_string(), dec!(100))]),
                states: Mutex::new(states.into()),
                fail_leverage: false,
                leverage_calls: Mutex::new(Vec::new()),
                orders: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExchangeApi for ScriptedExchange {
        async fn meta(&self) -> Result<Vec<AssetMeta>> {
            Ok(self.universe.clone())
        }

        async fn user_state(&self, _address: &str) -> Result<UserState> {
            Ok(self
                .states
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted account snapshot left"))
        }

        async fn all_mids(&self) -> Result<HashMap<String, Decimal>> {
            Ok(self.mids.clone())
        }

        async fn update_leverage(&self, asset_index: u32, leverage: u32) -> Result<()> {
            self.leverage_calls.lock().unwrap().push((asset_index, leverage));
            if self.fail_leverage {
                anyhow::bail!("Leverage update rejected: isolated position open");
            }
            Ok(())
        }

        async fn market_order(
            &self,
            asset_index: u32,
            is_buy: bool,
            size: Decimal,
            limit_price: Decimal,
            reduce_only: bool,
        ) -> Result<OrderFill> {
            self.orders.lock().unwrap().push(PlacedOrder {
                asset_index,
                is_buy,
                size,
                reduce_only,
            });
            Ok(OrderFill {
                total_size: Some(size),
                avg_price: Some(limit_price),
                order_id: Some(1),
            })
        }
    }

    fn snapshot(withdrawable: Decimal, positions: Vec<Position>) -> UserState {
        UserState {
            withdrawable,
            asset_positions: positions
                .into_iter()
                .map(|position| AssetPosition { position })
                .collect(),
        }
    }

    fn engine(api: ScriptedExchange) -> HyperliquidEngine<ScriptedExchange> {
        HyperliquidEngine {
            api,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            slippage_bps: 100,
        }
    }

    #[tokio::test]
    async fn invalid_percent_rejected_before_any_exchange_call() {
        let engine = engine(ScriptedExchange::new(Vec::new()));

        let outcome = engine
            .execute(TradeIntent::Open {
                ticker: "BTC".to_string(),
                side: Side::Long,
                percent: 0,
            })
            .await
            .unwrap();

        assert!(outcome.is_error());
        assert_eq!(outcome.message, "Percentage must be between 1 and 100, got 0");
        // the empty snapshot queue would have panicked on any account fetch
        assert!(engine.api.orders.lock().unwrap().is_empty());
        assert!(engine.api.leverage_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reversal_resizes_from_refreshed_balance() {
        let short = Position {
            coin: "BTC".to_string(),
            szi: dec!(-2),
            entry_px: None,
        };
        // $1000 before the close, $500 once the short is flattened
        let engine = engine(ScriptedExchange::new(vec![
            snapshot(dec!(1000), vec![short]),
            snapshot(dec!(500), vec![]),
        ]));

        let outcome = engine
            .execute(TradeIntent::Open {
                ticker: "btc".to_string(),
                side: Side::Long,
                percent: 10,
            })
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Success);

        let orders = engine.api.orders.lock().unwrap();
        assert_eq!(orders.len(), 2);

        // first the reduce-only buy flattening the 2-token short
        assert!(orders[0].reduce_only);
        assert!(orders[0].is_buy);
        assert_eq!(orders[0].size, dec!(2));

        // then the open, sized from the refreshed $500 balance:
        // 500 × 10% × 10x / $100 = 5, not the 10 the stale $1000 gave
        assert!(!orders[1].reduce_only);
        assert!(orders[1].is_buy);
        assert_eq!(orders[1].size, dec!(5));
        drop(orders);

        assert_eq!(outcome.details.unwrap().size, dec!(5));
    }

    #[tokio::test]
    async fn leverage_failure_does_not_abort_the_order() {
        let mut api = ScriptedExchange::new(vec![snapshot(dec!(1000), vec![])]);
        api.fail_leverage = true;
        let engine = engine(api);

        let outcome = engine
            .execute(TradeIntent::Open {
                ticker: "BTC".to_string(),
                side: Side::Long,
                percent: 5,
            })
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(engine.api.leverage_calls.lock().unwrap().len(), 1);

        // $1000 × 5% × 10x / $100 = 5 tokens, placed despite the rejection
        let orders = engine.api.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].size, dec!(5));
        assert_eq!(orders[0].asset_index, 0);
    }
}
