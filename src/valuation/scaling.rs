//! Conversion between on-chain base units and exact decimal values.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};

use super::ValuationError;

/// Largest decimals exponent accepted. 10^77 is the last power of ten below
/// `U256::MAX`.
pub const MAX_DECIMALS: u32 = 77;

/// Vault share tokens use a fixed 18-decimal scale regardless of the asset.
pub const SHARE_DECIMALS: u32 = 18;

pub(crate) fn check_decimals(decimals: u32) -> Result<(), ValuationError> {
    if decimals > MAX_DECIMALS {
        return Err(ValuationError::InvalidDecimals { decimals });
    }
    Ok(())
}

/// `10^decimals`.
pub fn scale_divisor(decimals: u32) -> Result<BigInt, ValuationError> {
    check_decimals(decimals)?;
    Ok(BigInt::from(10u8).pow(decimals))
}

/// Exact `base_units / 10^decimals`.
pub fn to_decimal(base_units: U256, decimals: u32) -> Result<BigDecimal, ValuationError> {
    bigint_to_decimal(u256_to_bigint(base_units), decimals)
}

pub(crate) fn bigint_to_decimal(base_units: BigInt, decimals: u32) -> Result<BigDecimal, ValuationError> {
    check_decimals(decimals)?;
    Ok(BigDecimal::new(base_units, i64::from(decimals)))
}

/// Inverse of [`to_decimal`]: `value * 10^decimals`, truncated toward zero.
pub fn to_base(value: &BigDecimal, decimals: u32) -> Result<U256, ValuationError> {
    let divisor = scale_divisor(decimals)?;
    if value.is_negative() {
        return Err(ValuationError::out_of_range(format!("negative amount {}", value)));
    }

    let scaled = value * BigDecimal::new(divisor, 0);
    let (units, _) = scaled.with_scale(0).into_bigint_and_exponent();
    bigint_to_u256(&units)
}

/// `floor(a * b / denominator)` computed on unbounded integers, so the
/// intermediate product never overflows. `None` when `denominator` is zero.
pub fn mul_div_floor(a: U256, b: U256, denominator: U256) -> Option<BigInt> {
    if denominator.is_zero() {
        return None;
    }
    let product = u256_to_bigint(a) * u256_to_bigint(b);
    Some(product / u256_to_bigint(denominator))
}

pub fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

pub fn bigint_to_u256(value: &BigInt) -> Result<U256, ValuationError> {
    if value.is_zero() {
        return Ok(U256::ZERO);
    }
    let (sign, bytes) = value.to_bytes_be();
    if sign == Sign::Minus {
        return Err(ValuationError::out_of_range(format!("negative amount {}", value)));
    }
    U256::try_from_be_slice(&bytes)
        .ok_or_else(|| ValuationError::out_of_range(format!("{} does not fit in 256 bits", value)))
}
