use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Long)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

/// A trading intent decoded from a webhook alert or an operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeIntent {
    /// Take a position of `percent`% of withdrawable balance on `ticker`.
    Open {
        ticker: String,
        side: Side,
        percent: u8,
    },
    /// Flatten a single asset.
    Close { ticker: String },
    /// Flatten everything.
    CloseAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    /// Some but not all positions closed.
    Partial,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    pub asset: String,
    pub side: Side,
    pub size: Decimal,
    pub leverage: u32,
    pub usd_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillSummary {
    pub size: Decimal,
    pub average_price: Decimal,
    pub order_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub asset: String,
    pub size: Decimal,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The business result of executing an intent. Serializes to the webhook
/// response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<OrderDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled: Option<FillSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub closed_positions: Vec<ClosedPosition>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failed_positions: Vec<ClosedPosition>,
}

impl ExecutionOutcome {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
            details: None,
            filled: None,
            closed_positions: Vec::new(),
            failed_positions: Vec::new(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            message: message.into(),
            details: None,
            filled: None,
            closed_positions: Vec::new(),
            failed_positions: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.status, OutcomeStatus::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_without_empty_fields() {
        let outcome = ExecutionOutcome::success("Successfully closed BTC position");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("details").is_none());
        assert!(json.get("closed_positions").is_none());
    }

    #[test]
    fn side_round_trips_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Short).unwrap(), "\"short\"");
        let side: Side = serde_json::from_str("\"long\"").unwrap();
        assert_eq!(side, Side::Long);
    }
}
