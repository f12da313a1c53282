use thiserror::Error;

/// Business-level failures of a trade intent. These map to a 400 at the
/// webhook boundary, as opposed to transport errors which surface as
/// `anyhow::Error`.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Percentage must be between 1 and 100, got {0}")]
    InvalidPercent(u8),

    #[error("Asset {0} not found")]
    UnknownAsset(String),

    #[error("Insufficient balance: no USDC available for trading")]
    InsufficientBalance,

    #[error("Could not get current price for {0}")]
    PriceUnavailable(String),

    #[error("Calculated position size too small. Try increasing the percentage.")]
    SizeTooSmall,

    #[error("Exchange rejected order: {0}")]
    Exchange(String),
}
