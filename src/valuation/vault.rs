//! Share-based lending vault valuation.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_traits::Zero;

use super::scaling::{bigint_to_decimal, check_decimals, mul_div_floor, to_decimal};
use super::CapabilityError;
use crate::models::{Valuation, ValuationMethod, ValuationResult};

/// Direct conversion placeholder for callers with no conversion capability.
pub type NoConversion = fn(U256) -> Result<U256, CapabilityError>;

/// Converts a user's vault share balance into an asset amount.
///
/// Resolution order:
/// 1. zero balance is `no-balance`, nothing else is consulted;
/// 2. the vault's own `shares -> assets` conversion, when provided and successful;
/// 3. `user_shares * total_assets / total_shares` in base units;
/// 4. `zero-supply` when the vault has no shares outstanding.
///
/// Share balances are 18-decimal quantities, `asset_decimals` only applies to
/// asset amounts.
pub fn value_shares<F>(
    user_shares: U256,
    total_assets: U256,
    total_shares: U256,
    asset_decimals: u32,
    direct_conversion: Option<F>,
) -> ValuationResult
where
    F: FnOnce(U256) -> Result<U256, CapabilityError>,
{
    check_decimals(asset_decimals)?;

    if user_shares.is_zero() {
        return Ok(Valuation::new(BigDecimal::zero(), ValuationMethod::NoBalance));
    }

    let mut fallback_reason = None;
    if let Some(convert) = direct_conversion {
        match convert(user_shares) {
            Ok(assets) => {
                return Ok(Valuation::new(
                    to_decimal(assets, asset_decimals)?,
                    ValuationMethod::DirectConversion,
                ));
            }
            Err(CapabilityError::Unsupported) => {
                fallback_reason = Some(CapabilityError::Unsupported);
            }
            Err(err) => {
                tracing::debug!(error = %err, "Direct conversion failed, falling back to pool ratio");
                fallback_reason = Some(err);
            }
        }
    }

    let valuation = match mul_div_floor(user_shares, total_assets, total_shares) {
        Some(assets) => Valuation::new(
            bigint_to_decimal(assets, asset_decimals)?,
            ValuationMethod::PoolRatio,
        ),
        None => Valuation::new(BigDecimal::zero(), ValuationMethod::ZeroSupply),
    };

    Ok(valuation.with_fallback_reason(fallback_reason))
}

/// [`value_shares`] for vaults without a direct conversion accessor.
pub fn value_shares_by_ratio(
    user_shares: U256,
    total_assets: U256,
    total_shares: U256,
    asset_decimals: u32,
) -> ValuationResult {
    value_shares(
        user_shares,
        total_assets,
        total_shares,
        asset_decimals,
        None::<NoConversion>,
    )
}
