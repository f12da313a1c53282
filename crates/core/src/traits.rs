use crate::intent::{ExecutionOutcome, TradeIntent};
use anyhow::Result;
use async_trait::async_trait;

/// The seam between the webhook surface and the exchange. Business failures
/// come back as an error-status [`ExecutionOutcome`]; transport failures as
/// `Err`.
#[async_trait]
pub trait IntentExecutor: Send + Sync {
    async fn execute(&self, intent: TradeIntent) -> Result<ExecutionOutcome>;
}
