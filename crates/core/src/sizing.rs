use crate::error::ExecutionError;
use rust_decimal::Decimal;

/// Calculate the token quantity for a percent-of-balance market order.
///
/// # Arguments
/// * `withdrawable` - Available USDC balance
/// * `percent` - Percentage of balance to commit (1-100)
/// * `leverage` - Leverage multiplier (the asset's max leverage)
/// * `price` - Current mid price for the asset
/// * `sz_decimals` - Size precision the exchange enforces for the asset
///
/// # Returns
/// Token quantity, truncated to `sz_decimals` decimal places.
///
/// # Errors
/// Returns an error if the percent is out of range, the balance or price is
/// non-positive, or the truncated size rounds to zero.
pub fn order_size(
    withdrawable: Decimal,
    percent: u8,
    leverage: u32,
    price: Decimal,
    sz_decimals: u32,
) -> Result<Decimal, ExecutionError> {
    if percent < 1 || percent > 100 {
        return Err(ExecutionError::InvalidPercent(percent));
    }

    if withdrawable <= Decimal::ZERO {
        return Err(ExecutionError::InsufficientBalance);
    }

    if price <= Decimal::ZERO {
        return Err(ExecutionError::PriceUnavailable(String::new()));
    }

    // notional = balance × percent/100 × leverage; size = notional / price
    let usdc_amount = withdrawable * Decimal::from(percent) / Decimal::from(100);
    let size = usdc_amount * Decimal::from(leverage) / price;
    let size = size.trunc_with_scale(sz_decimals).normalize();

    if size <= Decimal::ZERO {
        return Err(ExecutionError::SizeTooSmall);
    }

    Ok(size)
}
